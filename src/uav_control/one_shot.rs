/// A single-slot, read-and-clear value.
///
/// `set` overwrites whatever is pending (latest intent wins, nothing is queued)
/// and `take` is the only transition back to [`OneShot::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShot<T> {
    Idle,
    Pending(T),
}

impl<T> Default for OneShot<T> {
    fn default() -> Self { OneShot::Idle }
}

impl<T: Copy> OneShot<T> {
    pub fn set(&mut self, value: T) { *self = OneShot::Pending(value); }

    pub fn clear(&mut self) { *self = OneShot::Idle; }

    /// Returns the pending value, if any, and resets the slot to idle.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, OneShot::Idle) {
            OneShot::Pending(value) => Some(value),
            OneShot::Idle => None,
        }
    }

    pub fn peek(&self) -> Option<T> {
        match self {
            OneShot::Pending(value) => Some(*value),
            OneShot::Idle => None,
        }
    }
}
