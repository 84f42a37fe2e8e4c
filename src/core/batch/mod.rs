//! # Batch Module
//!
//! Partitions an ordered sequence of work items into fixed-size batches.
//!
//! Partitioning is pure: concatenating the produced batches reproduces the
//! input order exactly, every batch is full except possibly the last, and
//! no batch is ever empty. An empty input produces zero batches.

/// Default number of paths handed to one hashing job.
pub const DEFAULT_BATCH_CAPACITY: usize = 10;

/// Lazily partition `items` into batches of at most `capacity` elements.
///
/// # Panics
/// Panics if `capacity` is zero. A zero capacity is a programming error,
/// not a runtime input.
pub fn batches<I>(items: I, capacity: usize) -> BatchIter<I::IntoIter>
where
    I: IntoIterator,
{
    assert!(capacity > 0, "batch capacity must be at least 1");
    BatchIter {
        inner: items.into_iter(),
        capacity,
    }
}

/// Iterator adapter produced by [`batches`].
pub struct BatchIter<I> {
    inner: I,
    capacity: usize,
}

impl<I: Iterator> Iterator for BatchIter<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.capacity);
        for item in self.inner.by_ref() {
            batch.push(item);
            if batch.len() >= self.capacity {
                break;
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
