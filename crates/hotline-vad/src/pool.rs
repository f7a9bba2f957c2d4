use parking_lot::Mutex;
use thiserror::Error;

/// Stable identity of a slot in the buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

impl BufferId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("all speech buffers are claimed")]
pub struct PoolExhausted;

#[derive(Default)]
struct Slot {
    frames: Vec<Vec<i16>>,
    has_significant_speech: bool,
    claimed: bool,
}

/// Fixed-capacity pool of reusable utterance buffers.
///
/// Each slot has its own lock guarding its mutable fields; the pool
/// additionally serializes the claim scan so two concurrent claims cannot
/// select the same slot. A buffer is claimed by at most one session at a
/// time, and raw slot references never escape the pool.
pub struct BufferPool {
    slots: Vec<Mutex<Slot>>,
    claim_lock: Mutex<()>,
}

impl BufferPool {
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| Mutex::new(Slot::default())).collect(),
            claim_lock: Mutex::new(()),
        }
    }

    /// Claim the first unclaimed slot. O(N) scan over a small fixed N.
    pub fn claim(&self) -> Result<BufferId, PoolExhausted> {
        let _scan = self.claim_lock.lock();

        for (i, slot) in self.slots.iter().enumerate() {
            let mut slot = slot.lock();
            if !slot.claimed {
                slot.claimed = true;
                return Ok(BufferId(i));
            }
        }

        Err(PoolExhausted)
    }

    /// Clear the buffer's contents and flags and mark it unclaimed.
    /// Out-of-range ids are a no-op.
    pub fn release(&self, id: BufferId) {
        if let Some(slot) = self.slots.get(id.0) {
            let mut slot = slot.lock();
            slot.frames = Vec::new();
            slot.has_significant_speech = false;
            slot.claimed = false;
        }
    }

    /// Append one frame to a claimed buffer's utterance.
    pub fn append(&self, id: BufferId, frame: &[i16]) {
        if let Some(slot) = self.slots.get(id.0) {
            slot.lock().frames.push(frame.to_vec());
        }
    }

    pub fn mark_significant(&self, id: BufferId) {
        if let Some(slot) = self.slots.get(id.0) {
            slot.lock().has_significant_speech = true;
        }
    }

    /// Take the buffer's accumulated frames, leaving it empty but still
    /// claimed. Returns an empty vec for out-of-range ids.
    pub fn take_frames(&self, id: BufferId) -> Vec<Vec<i16>> {
        match self.slots.get(id.0) {
            Some(slot) => std::mem::take(&mut slot.lock().frames),
            None => Vec::new(),
        }
    }

    /// Scoped read access to a buffer's utterance and significant-speech
    /// flag. Returns `None` for out-of-range ids.
    pub fn with_buffer<R>(&self, id: BufferId, f: impl FnOnce(&[Vec<i16>], bool) -> R) -> Option<R> {
        self.slots.get(id.0).map(|slot| {
            let slot = slot.lock();
            f(&slot.frames, slot.has_significant_speech)
        })
    }

    /// Number of currently unclaimed slots.
    pub fn available(&self) -> usize {
        self.slots.iter().filter(|s| !s.lock().claimed).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
