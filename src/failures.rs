//! Pooled failure accumulation.
//!
//! Most binds produce no failures, so a [`FailureCollection`] takes a buffer
//! from the pool only when the first failure arrives. Buffers always go back
//! to the pool empty.

use parking_lot::Mutex;

use crate::error::BindingFailure;

/// A bounded free list of failure buffers.
#[derive(Debug)]
pub(crate) struct FailurePool {
    free: Mutex<Vec<Vec<BindingFailure>>>,
    max_pooled: usize,
    max_capacity: usize,
}

impl FailurePool {
    pub(crate) fn new(max_pooled: usize, max_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_pooled,
            max_capacity,
        }
    }

    pub(crate) fn collection(&self) -> FailureCollection<'_> {
        FailureCollection {
            pool: self,
            buffer: None,
        }
    }

    fn acquire(&self) -> Vec<BindingFailure> {
        self.free.lock().pop().unwrap_or_default()
    }

    fn release(&self, mut buffer: Vec<BindingFailure>) {
        buffer.clear();
        if buffer.capacity() == 0 || buffer.capacity() > self.max_capacity {
            return;
        }

        let mut free = self.free.lock();
        if free.len() < self.max_pooled {
            free.push(buffer);
        }
    }

    #[cfg(test)]
    pub(crate) fn pooled(&self) -> usize {
        self.free.lock().len()
    }
}

/// Failures gathered during one bind call.
///
/// Scoped to a single bind. The backing buffer is cleared and returned to the
/// pool by [`finish`](Self::finish), or on drop if the bind never finished.
pub(crate) struct FailureCollection<'p> {
    pool: &'p FailurePool,
    buffer: Option<Vec<BindingFailure>>,
}

impl FailureCollection<'_> {
    pub(crate) fn push(&mut self, failure: BindingFailure) {
        let pool = self.pool;
        self.buffer
            .get_or_insert_with(|| pool.acquire())
            .push(failure);
    }

    /// Moves the failures out in insertion order.
    pub(crate) fn finish(mut self) -> Vec<BindingFailure> {
        match self.buffer.take() {
            Some(mut buffer) => {
                let failures = buffer.drain(..).collect();
                self.pool.release(buffer);
                failures
            }
            None => Vec::new(),
        }
    }
}

impl Drop for FailureCollection<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::PropertyType;
    use crate::error::FailureKind;

    fn failure(name: &str) -> BindingFailure {
        BindingFailure::new(
            FailureKind::CoercionFailure,
            name,
            PropertyType::of::<u32>(),
            None,
            "bad",
        )
    }

    #[test]
    fn empty_collection_never_touches_pool() {
        let pool = FailurePool::new(4, 128);
        let failures = pool.collection().finish();

        assert!(failures.is_empty());
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn finish_preserves_order_and_recycles_buffer() {
        let pool = FailurePool::new(4, 128);
        let mut collection = pool.collection();
        collection.push(failure("a"));
        collection.push(failure("b"));

        let failures = collection.finish();
        let names: Vec<_> = failures.iter().map(|f| f.property_name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(pool.pooled(), 1);

        let mut reused = pool.collection();
        reused.push(failure("c"));
        assert_eq!(pool.pooled(), 0);
        assert_eq!(reused.finish().len(), 1);
    }

    #[test]
    fn dropped_collection_returns_cleared_buffer() {
        let pool = FailurePool::new(4, 128);
        {
            let mut collection = pool.collection();
            collection.push(failure("a"));
        }
        assert_eq!(pool.pooled(), 1);

        let mut collection = pool.collection();
        collection.push(failure("b"));
        let failures = collection.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].property_name(), "b");
    }

    #[test]
    fn oversized_buffers_are_dropped() {
        let pool = FailurePool::new(4, 2);
        let mut collection = pool.collection();
        for i in 0..10 {
            collection.push(failure(&i.to_string()));
        }

        assert_eq!(collection.finish().len(), 10);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn pool_size_is_bounded() {
        let pool = FailurePool::new(1, 128);
        let mut a = pool.collection();
        let mut b = pool.collection();
        a.push(failure("a"));
        b.push(failure("b"));

        a.finish();
        b.finish();
        assert_eq!(pool.pooled(), 1);
    }
}
