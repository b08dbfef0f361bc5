use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

static GLOBAL_CURSORS: LazyLock<Arc<CursorStore>> = LazyLock::new(|| Arc::new(CursorStore::new()));

/// Rotating selection counters, one per profile.
///
/// Each profile owns a 64-bit unsigned counter. [`next_index`](Self::next_index)
/// hands out the current value and increments it atomically, so concurrent
/// callers on the same profile always receive distinct, consecutive values.
/// Counters wrap from `u64::MAX` back to zero and never go negative.
///
/// Entries are created on first use and live until [`clear`](Self::clear).
///
/// # Example
///
/// ```
/// use edgepick_selector::CursorStore;
///
/// let cursors = CursorStore::new();
/// assert_eq!(cursors.next_index("etl"), 0);
/// assert_eq!(cursors.next_index("etl"), 1);
/// assert_eq!(cursors.peek("etl"), Some(2));
/// assert_eq!(cursors.peek("reporting"), None);
/// ```
#[derive(Debug, Default)]
pub struct CursorStore {
    cursors: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store used by [`EdgeNodeSelector::new`](crate::EdgeNodeSelector::new).
    pub fn global() -> Arc<CursorStore> {
        GLOBAL_CURSORS.clone()
    }

    /// Returns the profile's current counter value and advances it by one.
    ///
    /// Never blocks on other profiles' increments; the map lock is only
    /// write-locked when a profile is seen for the first time.
    pub fn next_index(&self, profile: &str) -> u64 {
        // fetch_add wraps on overflow; uniqueness only needs the RMW to be atomic
        self.cursor(profile).fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the value the next [`next_index`](Self::next_index) call would
    /// hand out, or `None` for an unseen profile.
    pub fn peek(&self, profile: &str) -> Option<u64> {
        self.cursors
            .read()
            .unwrap()
            .get(profile)
            .map(|cursor| cursor.load(Ordering::Relaxed))
    }

    /// Sets a profile's counter, creating it if needed.
    ///
    /// Lets tests and benchmarks start close to `u64::MAX` to exercise
    /// wraparound.
    pub fn seed(&self, profile: &str, value: u64) {
        self.cursor(profile).store(value, Ordering::Relaxed);
    }

    /// Removes every profile.
    pub fn clear(&self) {
        self.cursors.write().unwrap().clear();
    }

    /// Number of profiles with a counter.
    pub fn len(&self) -> usize {
        self.cursors.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cursor(&self, profile: &str) -> Arc<AtomicU64> {
        if let Some(cursor) = self.cursors.read().unwrap().get(profile) {
            return cursor.clone();
        }

        self.cursors
            .write()
            .unwrap()
            .entry(profile.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }
}
