use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out contiguous blocks of request ids.
///
/// One allocator is shared by every batch submitted through a client, so
/// concurrent in-flight batches never collide on an id: a whole block is
/// reserved with a single atomic add. The counter wraps at 2^32; an id may
/// therefore be reused once the counter comes back around while a very old
/// exchange is still in flight. That approximation is accepted rather than
/// guarded against.
#[derive(Debug, Default)]
pub struct RequestIdAllocator {
    next: AtomicU32,
}

impl RequestIdAllocator {
    /// Creates an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose first reservation starts at `start`.
    pub fn starting_at(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }

    /// Reserves a contiguous block of `n` ids and returns the first one.
    ///
    /// The block is `[start, start+1, ..., start+n-1]`, each id computed
    /// modulo 2^32. `reserve(0)` returns the current counter and reserves
    /// nothing. Safe to call from any number of threads or tasks; two
    /// reservations never overlap.
    pub fn reserve(&self, n: u32) -> u32 {
        self.next.fetch_add(n, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn blocks_are_contiguous_and_disjoint() {
        let ids = RequestIdAllocator::new();
        assert_eq!(ids.reserve(3), 0);
        assert_eq!(ids.reserve(1), 3);
        assert_eq!(ids.reserve(5), 4);
        assert_eq!(ids.reserve(1), 9);
    }

    #[test]
    fn reserve_zero_does_not_advance() {
        let ids = RequestIdAllocator::starting_at(7);
        assert_eq!(ids.reserve(0), 7);
        assert_eq!(ids.reserve(0), 7);
        assert_eq!(ids.reserve(2), 7);
        assert_eq!(ids.reserve(0), 9);
    }

    #[test]
    fn counter_wraps_at_u32_max() {
        let ids = RequestIdAllocator::starting_at(u32::MAX);
        let start = ids.reserve(2);
        assert_eq!(start, u32::MAX);
        // Block [u32::MAX, 0]; the next reservation starts past the wrap.
        assert_eq!(start.wrapping_add(1), 0);
        assert_eq!(ids.reserve(1), 1);
    }

    #[test]
    fn concurrent_reservations_never_overlap() {
        let ids = Arc::new(RequestIdAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| ids.reserve(5)).collect::<Vec<u32>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for start in handle.join().unwrap() {
                for offset in 0..5 {
                    assert!(seen.insert(start.wrapping_add(offset)));
                }
            }
        }
        assert_eq!(seen.len(), 8 * 100 * 5);
        assert_eq!(ids.reserve(0), 8 * 100 * 5);
    }
}
