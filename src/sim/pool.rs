//! Generational object pool
//!
//! Slots are recycled through a free list and never shrink. Each release
//! bumps the slot generation, so a handle kept past its release no longer
//! resolves and cannot alias the slot's next occupant.

use serde::{Deserialize, Serialize};

/// Reference to a pooled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

/// Unbounded pool of reusable records
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a recycled slot (or grow) and mark it active
    ///
    /// The record keeps whatever the previous occupant left in it; callers
    /// overwrite the fields they use.
    pub fn acquire(&mut self) -> Handle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(!slot.active, "free list held an active slot");
            slot.active = true;
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: T::default(),
            generation: 0,
            active: true,
        });
        Handle {
            index,
            generation: 0,
        }
    }
}

impl<T> Pool<T> {
    /// Return a record to the free list
    ///
    /// Stale or already-released handles are ignored and return `false`.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            return false;
        }
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    /// Whether the handle refers to a live record
    pub fn is_active(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    /// Number of records currently handed out
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Records waiting on the free list
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot indices on the free list
    pub fn free_indices(&self) -> &[u32] {
        &self.free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_acquire_grows_then_recycles() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a, b);
        assert_eq!(pool.capacity(), 2);

        assert!(pool.release(a));
        let c = pool.acquire();
        // Same slot, new generation
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.acquire();
        *pool.get_mut(a).unwrap() = 7;
        pool.release(a);
        let b = pool.acquire();
        assert!(pool.get(a).is_none());
        assert!(!pool.is_active(a));
        assert_eq!(pool.get(b), Some(&7));
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.acquire();
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.free_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_n_acquires_give_n_distinct_live(n in 1usize..64) {
            let mut pool: Pool<u8> = Pool::new();
            let handles: HashSet<_> = (0..n).map(|_| pool.acquire()).collect();
            prop_assert_eq!(handles.len(), n);
            prop_assert_eq!(pool.active_count(), n);
        }

        #[test]
        fn prop_live_and_free_are_disjoint(ops in proptest::collection::vec(any::<bool>(), 1..200)) {
            let mut pool: Pool<u8> = Pool::new();
            let mut live: Vec<Handle> = Vec::new();
            for acquire in ops {
                if acquire || live.is_empty() {
                    live.push(pool.acquire());
                } else {
                    let h = live.remove(0);
                    prop_assert!(pool.release(h));
                }
                let free: HashSet<u32> = pool.free_indices().iter().copied().collect();
                for h in &live {
                    prop_assert!(!free.contains(&h.index()));
                    prop_assert!(pool.is_active(*h));
                }
                prop_assert_eq!(pool.active_count(), live.len());
            }
        }
    }
}
