//! Recycling allocator for entity slots

use crate::entity::Entity;
use canvasbench_core::{Result, SimError, SlotId};

/// Most slots a pool may hold. Slot ids travel as `f32` in snapshot records,
/// which represent every integer up to 2^24 exactly.
pub const MAX_SLOTS: usize = 1 << 24;

/// Free-list pool of entity slots.
///
/// Every slot is either idle (on the free list) or in use; `idle_count() +
/// in_use_count() == capacity()` holds after every call. Slots are never
/// removed implicitly, only through [`EntityPool::trim`]. The pool does not
/// track *which* entities are active in what order; that is the engine's job.
pub struct EntityPool {
    slots: Vec<Entity>,
    in_use: Vec<bool>,
    /// LIFO free list. Its capacity is kept at least `slots.len()` so that
    /// `release` never allocates.
    idle: Vec<SlotId>,
    in_use_count: usize,
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            in_use: Vec::new(),
            idle: Vec::new(),
            in_use_count: 0,
        }
    }

    /// Pool with `capacity` idle slots
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut pool = Self::new();
        pool.warm_up(capacity)?;
        Ok(pool)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use_count
    }

    /// Make sure `additional` more slots can be created without reallocating.
    /// Growing past [`MAX_SLOTS`] fails with `SimError::Allocation`.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let alloc_err = |_: std::collections::TryReserveError| SimError::Allocation {
            requested: additional,
        };
        let target = self.slots.len().saturating_add(additional);
        if target > MAX_SLOTS {
            return Err(SimError::Allocation {
                requested: additional,
            });
        }
        self.slots.try_reserve(additional).map_err(alloc_err)?;
        self.in_use.try_reserve(additional).map_err(alloc_err)?;
        self.idle
            .try_reserve(target.saturating_sub(self.idle.len()))
            .map_err(alloc_err)?;
        Ok(())
    }

    /// Grow to at least `capacity` slots. Never shrinks.
    pub fn warm_up(&mut self, capacity: usize) -> Result<()> {
        let current = self.slots.len();
        if capacity <= current {
            return Ok(());
        }
        self.reserve(capacity - current)?;
        for _ in current..capacity {
            self.slots.push(Entity::idle());
            self.in_use.push(false);
        }
        // Highest index first so acquisition hands out low indices first
        for index in (current..capacity).rev() {
            self.idle.push(SlotId::from_index(index));
        }
        Ok(())
    }

    /// Take an idle slot, growing the pool by one when none is left.
    ///
    /// The returned slot is marked in use but its entity is not reset.
    pub fn acquire(&mut self) -> Result<SlotId> {
        let id = match self.idle.pop() {
            Some(id) => id,
            None => {
                self.reserve(1)?;
                let id = SlotId::from_index(self.slots.len());
                self.slots.push(Entity::idle());
                self.in_use.push(false);
                id
            }
        };
        self.in_use[id.index()] = true;
        self.in_use_count += 1;
        Ok(id)
    }

    /// Return a slot to the free list. Releasing an idle or unknown slot is a no-op.
    pub fn release(&mut self, id: SlotId) {
        let Some(flag) = self.in_use.get_mut(id.index()) else {
            return;
        };
        if !*flag {
            return;
        }
        *flag = false;
        self.in_use_count -= 1;
        let entity = &mut self.slots[id.index()];
        entity.active = false;
        entity.selected = false;
        self.idle.push(id);
    }

    pub fn is_in_use(&self, id: SlotId) -> bool {
        self.in_use.get(id.index()).copied().unwrap_or(false)
    }

    pub fn get(&self, id: SlotId) -> Option<&Entity> {
        self.slots.get(id.index())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index())
    }

    /// Explicit shrink: drop trailing idle slots until the pool holds at most
    /// `min_capacity` slots or the last slot is in use. Returns how many were dropped.
    pub fn trim(&mut self, min_capacity: usize) -> usize {
        let mut new_len = self.slots.len();
        while new_len > min_capacity && !self.in_use[new_len - 1] {
            new_len -= 1;
        }
        let dropped = self.slots.len() - new_len;
        if dropped > 0 {
            self.idle.retain(|id| id.index() < new_len);
            self.slots.truncate(new_len);
            self.in_use.truncate(new_len);
            self.slots.shrink_to_fit();
            self.in_use.shrink_to_fit();
        }
        dropped
    }

    /// Bytes held by the pool's backing storage
    pub fn memory_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Entity>()
            + self.in_use.capacity() * std::mem::size_of::<bool>()
            + self.idle.capacity() * std::mem::size_of::<SlotId>()
    }
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}
