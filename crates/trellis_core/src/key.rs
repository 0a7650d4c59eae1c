//! Process-unique keys for widgets and layout nodes.
//!
//! A [`Key`] names one widget for the lifetime of the process. The same key
//! is stamped onto the width and height interval nodes built for that widget,
//! which is how a resolved layout finds its way back to the widget tree.
//!
//! Keys are issued from a monotonically increasing counter and are never
//! reused, even after the widget they named is gone.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::Key;
//!
//! let a = Key::new();
//! let b = Key::new();
//! assert_ne!(a, b);
//! assert!(a < b);
//! ```

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next key to hand out. Zero is reserved so `Option<Key>` stays one word.
static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a widget and its layout nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(NonZeroU64);

impl Key {
    /// Issue a fresh key.
    ///
    /// Every call returns a key strictly greater than all previously issued
    /// keys in this process.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let raw = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 issues to wrap.
        match NonZeroU64::new(raw) {
            Some(raw) => Key(raw),
            None => panic!("widget key space exhausted"),
        }
    }

    /// Convert to raw u64 for storage or logging
    pub fn to_raw(self) -> u64 {
        self.0.get()
    }

    /// Reconstruct from a raw u64 produced by [`Key::to_raw`].
    ///
    /// Returns `None` for zero, which is never issued.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Key)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_keys_in_loop() {
        let keys: Vec<Key> = (0..5).map(|_| Key::new()).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_keys_are_monotonic() {
        let first = Key::new();
        let second = Key::new();
        let third = Key::new();
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_raw_round_trip() {
        let key = Key::new();
        assert_eq!(Key::from_raw(key.to_raw()), Some(key));
        assert_eq!(Key::from_raw(0), None);
    }

    #[test]
    fn test_option_key_is_one_word() {
        assert_eq!(
            std::mem::size_of::<Option<Key>>(),
            std::mem::size_of::<u64>()
        );
    }
}
