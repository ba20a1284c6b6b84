//! Ring Buffer Implementation

/// Default buffer capacity (150 samples = ~10s at 15fps)
pub const DEFAULT_CAPACITY: usize = 150;

/// Fixed-capacity FIFO ring buffer.
///
/// Storage grows up to `capacity` and is then overwritten in place. `head`
/// points at the oldest entry once the buffer is full.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Backing storage (never longer than `capacity`)
    storage: Vec<T>,
    /// Capacity of the buffer
    capacity: usize,
    /// Index of the oldest entry
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Create a buffer with default capacity (150 samples)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.storage.len() < self.capacity {
            self.storage.push(item);
            return None;
        }

        let evicted = std::mem::replace(&mut self.storage[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Item at logical position `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.storage.len() {
            return None;
        }
        self.storage.get((self.head + index) % self.storage.len())
    }

    /// Most recently pushed item
    pub fn latest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.storage.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// The last `count` items, oldest first
    pub fn iter_last(&self, count: usize) -> impl Iterator<Item = &T> + '_ {
        let skip = self.len().saturating_sub(count);
        self.iter().skip(skip)
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy out the contents, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
