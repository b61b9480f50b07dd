//! Reusable slot allocator
//!
//! Slots are never freed, only flagged inactive. `acquire` hands back the
//! first inactive slot (or grows the pool) with its previous contents intact,
//! so callers must overwrite every field they read.

/// A pool slot: the stored value plus its live flag
#[derive(Debug, Clone)]
struct Slot<T> {
    active: bool,
    item: T,
}

/// Growable pool of reusable entity slots
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Create a pool with `capacity` inactive slots already allocated
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            active: false,
            item: T::default(),
        });
        Self { slots }
    }

    /// Mark the first free slot active and return it, growing if none is free
    pub fn acquire(&mut self) -> (usize, &mut T) {
        let index = match self.slots.iter().position(|s| !s.active) {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    active: false,
                    item: T::default(),
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.active = true;
        (index, &mut slot.item)
    }
}

impl<T> Pool<T> {
    /// Mark a slot inactive. Returns false if it already was (or is out of range).
    pub fn release(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.active => {
                slot.active = false;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.active)
    }

    /// Live item at `index`, `None` for inactive slots
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots
            .get(index)
            .filter(|s| s.active)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots
            .get_mut(index)
            .filter(|s| s.active)
            .map(|s| &mut s.item)
    }

    /// Number of active slots
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Total slots allocated, active or not
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Flag every slot inactive (run restart)
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_acquire_reuses_first_free_slot() {
        let mut pool: Pool<u32> = Pool::new();
        let (a, _) = pool.acquire();
        let (b, _) = pool.acquire();
        let (c, _) = pool.acquire();
        assert_eq!((a, b, c), (0, 1, 2));

        pool.release(b);
        let (d, _) = pool.acquire();
        assert_eq!(d, 1);
        assert_eq!(pool.capacity(), 3);
    }

    #[test]
    fn test_released_slot_keeps_stale_value() {
        let mut pool: Pool<u32> = Pool::new();
        let (i, v) = pool.acquire();
        *v = 42;
        pool.release(i);
        assert!(pool.get(i).is_none());

        let (j, v) = pool.acquire();
        assert_eq!(i, j);
        assert_eq!(*v, 42);
    }

    #[test]
    fn test_with_capacity_starts_inactive() {
        let mut pool: Pool<u8> = Pool::with_capacity(4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.active_count(), 0);
        pool.acquire();
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_double_release_is_harmless() {
        let mut pool: Pool<u8> = Pool::new();
        let (i, _) = pool.acquire();
        assert!(pool.release(i));
        assert!(!pool.release(i));
        assert!(!pool.release(99));
        assert_eq!(pool.active_count(), 0);

        // The slot is handed out exactly once afterwards
        let (a, _) = pool.acquire();
        let (b, _) = pool.acquire();
        assert_ne!(a, b);
        assert_eq!(pool.active_count(), 2);
    }

    proptest! {
        #[test]
        fn prop_release_is_idempotent(
            ops in proptest::collection::vec((any::<bool>(), 0usize..16), 1..64)
        ) {
            let mut pool: Pool<u8> = Pool::new();
            let mut live = std::collections::BTreeSet::new();
            for (acquire, index) in ops {
                if acquire {
                    let (i, _) = pool.acquire();
                    prop_assert!(live.insert(i), "slot {} handed out twice", i);
                } else {
                    pool.release(index);
                    pool.release(index);
                    live.remove(&index);
                }
                prop_assert_eq!(pool.active_count(), live.len());
            }
        }
    }
}
