use tandem_shared::{merge_attributes, AttributeMap, Value};

/// Model changes received since the last render frame, merged with the
/// same rule the replica uses, so later keys win.
///
/// A render host merges map values into what the node already holds. A
/// delta that turns a slot from a map into a non-map (or back) therefore
/// starts a new segment; segments are applied in order, so the node ends
/// up exactly where the replica's merge does.
#[derive(Clone, Debug, Default)]
pub struct FrameBatch {
    segments: Vec<AttributeMap>,
}

impl FrameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: &AttributeMap) {
        match self.segments.last_mut() {
            Some(segment) if !changes_shape(segment, delta) => {
                merge_attributes(segment, delta);
            }
            _ => {
                let mut segment = AttributeMap::new();
                merge_attributes(&mut segment, delta);
                self.segments.push(segment);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The merged segments, in application order. Empty if nothing arrived
    /// this frame.
    pub fn take(&mut self) -> Vec<AttributeMap> {
        std::mem::take(&mut self.segments)
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

// True if merging `delta` replaces a map with a non-map or a non-map with
// a map anywhere in `pending`
fn changes_shape(pending: &AttributeMap, delta: &AttributeMap) -> bool {
    delta.iter().any(|(key, incoming)| match (pending.get(key), incoming) {
        (Some(Value::Map(current)), Value::Map(update)) => changes_shape(current, update),
        (Some(Value::Map(_)), _) | (Some(_), Value::Map(_)) => true,
        _ => false,
    })
}
