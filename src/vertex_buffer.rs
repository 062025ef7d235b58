use crate::error::{Error, Result};

/// Fixed-capacity append-only buffer of vertex components.
///
/// Capacity is fixed at construction so the per-frame hot path never
/// reallocates. The renderer's shared instance is configured to clear itself
/// whenever a snapshot is taken, so "flush to device" and "reset for the next
/// batch" are one operation.
#[derive(Debug)]
pub struct VertexBuffer {
    storage: Vec<f32>,
    length: usize,
    auto_clear_on_snapshot: bool,
}

impl VertexBuffer {
    /// A buffer that keeps its contents across snapshots.
    pub fn new(capacity: usize) -> Self {
        VertexBuffer {
            storage: vec![0.0; capacity],
            length: 0,
            auto_clear_on_snapshot: false,
        }
    }

    /// A buffer that resets to empty as a side effect of every `snapshot`.
    pub fn auto_clearing(capacity: usize) -> Self {
        VertexBuffer {
            storage: vec![0.0; capacity],
            length: 0,
            auto_clear_on_snapshot: true,
        }
    }

    /// Appends `values` in order starting at the current length.
    ///
    /// A write that would exceed capacity fails with
    /// [`Error::BufferOverflow`] before mutating anything; there are no
    /// partial writes.
    pub fn add(&mut self, values: &[f32]) -> Result<()> {
        if self.length + values.len() > self.storage.len() {
            return Err(Error::BufferOverflow {
                length: self.length,
                requested: values.len(),
                capacity: self.storage.len(),
            });
        }

        self.storage[self.length..self.length + values.len()].copy_from_slice(values);
        self.length += values.len();
        Ok(())
    }

    /// Resets the length to zero. Storage beyond the new length is garbage
    /// and must never be read.
    pub fn clear(&mut self) {
        self.length = 0;
    }

    /// Returns `(length, storage)`; only the first `length` components of
    /// `storage` are valid.
    ///
    /// With auto-clear enabled the buffer is cleared as a side effect, after
    /// the returned length is captured — callers must read the length before
    /// triggering any further clear.
    pub fn snapshot(&mut self) -> (usize, &[f32]) {
        let length = self.length;
        if self.auto_clear_on_snapshot {
            self.clear();
        }
        (length, &self.storage)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }
}
