pub mod frame_batch;
pub mod render_bridge;
