pub mod attribute_filter;
pub mod host_value;
pub mod merge;
pub mod value;
