//! Pre-warmed free-list arena for high-churn objects
//!
//! Bullets spawn and die every few hundred milliseconds; the pool keeps
//! steady-state play allocation-free. Slots are indexed by generation-checked
//! handles, so a stale handle reads as `None` and a double release is a
//! no-op rather than a free-list corruption.
//!
//! Caller contract: do not acquire or release while iterating the alive set
//! with `for_each`/`for_each_mut`; defer membership changes to after the
//! pass (the scene does this in its cleanup phase).

use serde::{Deserialize, Serialize};

/// Index + generation reference into a [`Pool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    generation: u32,
    alive: bool,
}

/// Fixed-capacity recycler with soft growth
///
/// `capacity` is a pre-warm hint, not a ceiling: `acquire` constructs a new
/// slot when the free list runs dry.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    /// Compact alive list, rebuilt by `compact`; may hold stale handles
    /// between a release and the next `compact`.
    alive: Vec<Handle>,
    create: Box<dyn FnMut() -> T>,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize, create: impl FnMut() -> T + 'static) -> Self {
        let mut create = Box::new(create) as Box<dyn FnMut() -> T>;
        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                item: create(),
                generation: 0,
                alive: false,
            })
            .collect();
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            alive: Vec::with_capacity(capacity),
            create,
        }
    }

    /// Take an instance out of the free list, growing the arena if empty.
    /// Never fails.
    pub fn acquire(&mut self) -> Handle {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                let i = self.slots.len() as u32;
                self.slots.push(Slot {
                    item: (self.create)(),
                    generation: 0,
                    alive: false,
                });
                log::debug!("pool grew past pre-warm capacity to {} slots", i + 1);
                i
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.alive = true;
        let handle = Handle {
            index,
            generation: slot.generation,
        };
        self.alive.push(handle);
        handle
    }

    /// Return an instance to the free list. Stale or already-released
    /// handles are ignored.
    pub fn release(&mut self, handle: Handle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if !slot.alive || slot.generation != handle.generation {
            return;
        }
        slot.alive = false;
        // Invalidate outstanding handles to this slot
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.alive && s.generation == handle.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.alive && s.generation == handle.generation)
            .map(|s| &mut s.item)
    }

    /// Visit every currently-alive item
    pub fn for_each(&self, mut f: impl FnMut(Handle, &T)) {
        for &h in &self.alive {
            if let Some(item) = self.get(h) {
                f(h, item);
            }
        }
    }

    /// Visit every currently-alive item mutably
    pub fn for_each_mut(&mut self, mut f: impl FnMut(Handle, &mut T)) {
        for i in 0..self.alive.len() {
            let h = self.alive[i];
            if let Some(item) = self.get_mut(h) {
                f(h, item);
            }
        }
    }

    /// Drop handles released since the last compact from the alive list
    pub fn compact(&mut self) {
        let slots = &self.slots;
        self.alive.retain(|h| {
            slots
                .get(h.index as usize)
                .is_some_and(|s| s.alive && s.generation == h.generation)
        });
    }

    /// Current alive handles. Accurate after `compact`.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        let slots = &self.slots;
        self.alive.iter().copied().filter(move |h| {
            slots
                .get(h.index as usize)
                .is_some_and(|s| s.alive && s.generation == h.generation)
        })
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total constructed instances (pre-warm plus growth)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("slots", &self.slots.len())
            .field("alive", &self.alive_count())
            .field("free", &self.free.len())
            .finish()
    }
}
