use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::TransformError;

struct Slot {
    latest: Vec<f32>,
    /// Set by `commit`, cleared by a successful take. MUST only change under the same lock
    /// acquisition that touches `latest`.
    fresh: bool,
}

/// Single-slot mailbox holding the most recent spectrum. A commit overwrites whatever is in the
/// slot, read or not, and each committed spectrum can be taken at most once.
///
/// This is deliberately not a queue: if the producer commits twice before anybody takes, the
/// first spectrum is gone, and taking twice after one commit gets nothing the second time.
pub struct SpectrumChannel {
    slot: Mutex<Slot>,
}

impl SpectrumChannel {
    /// Creates an empty channel for spectra of exactly `len` bins.
    pub fn new(len: usize) -> Self {
        Self {
            slot: Mutex::new(Slot {
                latest: vec![0.0; len],
                fresh: false,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().latest.len()
    }

    /// Copies `spectrum` into the slot and marks it fresh, in one critical section.
    pub fn commit(&self, spectrum: &[f32]) -> Result<(), TransformError> {
        let mut slot = self.lock();
        check_len(slot.latest.len(), spectrum.len())?;
        slot.latest.copy_from_slice(spectrum);
        slot.fresh = true;
        Ok(())
    }

    /// If a fresh spectrum is waiting, copies it into `out`, marks the slot consumed and returns
    /// true. Otherwise leaves `out` untouched and returns false.
    pub fn try_take_into(&self, out: &mut [f32]) -> Result<bool, TransformError> {
        let mut slot = self.lock();
        check_len(slot.latest.len(), out.len())?;
        if !slot.fresh {
            return Ok(false);
        }
        out.copy_from_slice(&slot.latest);
        slot.fresh = false;
        Ok(true)
    }

    /// Allocating version of [`Self::try_take_into`].
    #[cfg(test)]
    pub fn try_take(&self) -> Option<Vec<f32>> {
        let mut slot = self.lock();
        if !slot.fresh {
            return None;
        }
        slot.fresh = false;
        Some(slot.latest.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Both writers of the slot finish their copy before anything that could panic, so a
        // poisoned lock still guards a consistent slot.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::Length { expected, actual })
    }
}
