/// A single captured still image: encoded bytes plus a capture index.
///
/// The pixel content stays opaque to this library; decoding happens on
/// the remote service. A `Frame` is owned by one loop iteration and
/// dropped when that iteration ends, whatever the outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, index: usize) -> Self {
        debug_assert!(!data.is_empty(), "frame data must not be empty");
        Self { data, index }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Zero-based capture attempt this frame came from.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
