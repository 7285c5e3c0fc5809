//! Circular experience buffer
//!
//! Fixed-capacity FIFO store of belief samples. Once full, every append
//! overwrites the oldest surviving sample. Slot storage is allocated on the
//! first pass and refilled in place afterwards.
//!
//! Each slot sits behind its own lock and the writer fills the slot before it
//! publishes the advanced cursor, so concurrent readers observe either the
//! fully-old or the fully-new sample of a slot, never a mix.

use beliefpool_common::{BeliefPoolError, BeliefSample, Result};
use parking_lot::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    /// Next slot to write
    index: usize,
    /// Number of appends, capped at capacity
    filled: usize,
}

/// Ring buffer of belief samples with overwrite eviction
pub struct CircularExperienceBuffer {
    slots: Vec<RwLock<Option<BeliefSample>>>,
    cursor: RwLock<Cursor>,
    /// Serializes writers; readers never take it
    writer: Mutex<()>,
}

impl CircularExperienceBuffer {
    /// Create an empty buffer holding at most `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BeliefPoolError::Config(
                "buffer capacity must be positive".into(),
            ));
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || RwLock::new(None));

        Ok(Self {
            slots,
            cursor: RwLock::new(Cursor::default()),
            writer: Mutex::new(()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of valid samples, never more than capacity
    pub fn len(&self) -> usize {
        self.cursor.read().filled
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `sample` into the slot under the cursor and advance it
    pub fn append(&self, sample: &BeliefSample) {
        let _writer = self.writer.lock();
        let index = self.cursor.read().index;

        {
            let mut slot = self.slots[index].write();
            match slot.as_mut() {
                Some(existing) => existing.copy_from(sample),
                None => *slot = Some(sample.clone()),
            }
        }

        let mut cursor = self.cursor.write();
        cursor.index = (index + 1) % self.slots.len();
        cursor.filled = (cursor.filled + 1).min(self.slots.len());
    }

    /// Sample at logical position `i`, where 0 is the oldest surviving sample
    pub fn get(&self, i: usize) -> Result<BeliefSample> {
        let physical = self.physical_index(i)?;
        self.read_slot(physical, i, |s| s.clone())
    }

    /// Copy the sample at logical position `i` into `out`
    pub fn get_into(&self, i: usize, out: &mut BeliefSample) -> Result<()> {
        let physical = self.physical_index(i)?;
        self.read_slot(physical, i, |s| out.copy_from(s))
    }

    /// Snapshot of all valid samples, oldest first
    pub fn snapshot(&self) -> Vec<BeliefSample> {
        let len = self.len();
        (0..len).filter_map(|i| self.get(i).ok()).collect()
    }

    fn physical_index(&self, i: usize) -> Result<usize> {
        let cursor = *self.cursor.read();
        if i >= cursor.filled {
            return Err(BeliefPoolError::Index {
                index: i,
                len: cursor.filled,
            });
        }
        if cursor.filled < self.slots.len() {
            Ok(i)
        } else {
            Ok((cursor.index + i) % self.slots.len())
        }
    }

    fn read_slot<T>(
        &self,
        physical: usize,
        logical: usize,
        f: impl FnOnce(&BeliefSample) -> T,
    ) -> Result<T> {
        let slot = self.slots[physical].read();
        slot.as_ref().map(f).ok_or(BeliefPoolError::Index {
            index: logical,
            len: self.len(),
        })
    }
}

impl std::fmt::Debug for CircularExperienceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cursor = *self.cursor.read();
        f.debug_struct("CircularExperienceBuffer")
            .field("capacity", &self.slots.len())
            .field("index", &cursor.index)
            .field("filled", &cursor.filled)
            .finish()
    }
}
