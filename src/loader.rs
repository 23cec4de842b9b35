use std::sync::{Arc, Mutex};

/// Process-wide memoized loader. The first successful initialization is
/// cached and shared; a failed one is not, so callers can retry. The lock
/// is held across initialization, which also collapses concurrent first
/// calls into a single load.
pub struct LoadOnce<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> LoadOnce<T> {
    pub const fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Whether a value has already been loaded. Monotonic: once true it
    /// stays true for the life of the process.
    pub fn is_ready(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Returns the cached value, or runs `init` to produce it. Errors pass
    /// straight through and leave the slot empty.
    pub fn get_or_try<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            // A panic mid-init poisons the lock; the slot is still empty,
            // so retrying with the recovered guard is sound.
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = Arc::new(init()?);
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl<T> Default for LoadOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}
