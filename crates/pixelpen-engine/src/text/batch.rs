/// Number of glyph instances a single batch can hold.
pub const BATCH_CAPACITY: usize = 400;

/// Bounded working buffer for instances awaiting a draw call.
///
/// Only pushed-and-not-yet-drained entries are ever visible; draining hands
/// out exactly the live prefix and leaves the buffer empty.
#[derive(Debug, Clone)]
pub struct InstanceBatch<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> InstanceBatch<T> {
    /// Creates a batch holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { items: Vec::with_capacity(capacity), capacity }
    }

    /// Appends `item`, handing it back if the batch is already full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live entries in push order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Removes and yields every live entry; the allocation is kept.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for InstanceBatch<T> {
    fn default() -> Self {
        Self::with_capacity(BATCH_CAPACITY)
    }
}
