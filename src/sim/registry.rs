//! Live entity collections
//!
//! A `Roster` pairs a pool with the list of slots handed out from it, in
//! spawn order. Iteration always re-checks the pool flag, so an entity
//! released mid-frame is skipped by every later pass.

use super::pool::Pool;
use crate::consts::POOL_PREALLOC;

#[derive(Debug, Clone)]
pub struct Roster<T> {
    pool: Pool<T>,
    live: Vec<usize>,
}

impl<T: Default> Default for Roster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> Roster<T> {
    pub fn new() -> Self {
        Self {
            pool: Pool::with_capacity(POOL_PREALLOC),
            live: Vec::new(),
        }
    }

    /// Acquire a slot and append it to the live list
    pub fn spawn(&mut self) -> (usize, &mut T) {
        let (index, _) = self.pool.acquire();
        // A reused slot may still have a stale entry awaiting compaction
        self.live.retain(|&i| i != index);
        self.live.push(index);
        let item = self
            .pool
            .get_mut(index)
            .unwrap_or_else(|| unreachable!("slot {index} was just acquired"));
        (index, item)
    }
}

impl<T> Roster<T> {
    /// Return a slot to the pool. Returns false if it was not live.
    pub fn release(&mut self, index: usize) -> bool {
        self.pool.release(index)
    }

    #[inline]
    pub fn is_live(&self, index: usize) -> bool {
        self.pool.is_active(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.pool.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.pool.get_mut(index)
    }

    /// Live slot indices in spawn order (copied, so callers may mutate while walking)
    pub fn indices(&self) -> Vec<usize> {
        self.live
            .iter()
            .copied()
            .filter(|&i| self.pool.is_active(i))
            .collect()
    }

    /// Live entities in spawn order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.live
            .iter()
            .filter_map(|&i| self.pool.get(i).map(|item| (i, item)))
    }

    /// Drop released slots from the live list
    pub fn compact(&mut self) {
        let pool = &self.pool;
        self.live.retain(|&i| pool.is_active(i));
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release everything (run restart)
    pub fn clear(&mut self) {
        self.pool.release_all();
        self.live.clear();
    }

    /// Pool slots allocated so far
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}
