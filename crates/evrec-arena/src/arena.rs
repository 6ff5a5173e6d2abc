//! Typed generational slot arena.
//!
//! [`Arena`] stores values of one kind and hands out typed keys. Vacated
//! slots go on a free list and are reused LIFO; each reuse bumps the slot
//! generation so keys issued for the previous occupant stay stale forever
//! (modulo `u32` wrap-around, which would need four billion reuses of a
//! single slot).

use std::fmt;
use std::marker::PhantomData;

use evrec_core::ArenaKey;

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// A single arena slot.
#[derive(Clone, Debug)]
struct Slot<T> {
    /// Generation of the current (or next) occupant.
    generation: u32,
    /// The occupant, if the slot is live.
    value: Option<T>,
}

/// Generational slot arena keyed by `K`.
///
/// # Examples
///
/// ```
/// use evrec_arena::Arena;
/// use evrec_core::ParticleId;
///
/// let mut arena: Arena<ParticleId, &str> = Arena::new();
/// let a = arena.insert("a").unwrap();
/// assert_eq!(arena.get(a), Some(&"a"));
/// arena.remove(a);
/// let b = arena.insert("b").unwrap();
/// // Same slot, new generation: the old key no longer resolves.
/// assert_eq!(arena.get(a), None);
/// assert_eq!(arena.get(b), Some(&"b"));
/// ```
pub struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    /// Indices of vacant slots available for reuse.
    free_list: Vec<u32>,
    live: usize,
    max_slots: u32,
    _key: PhantomData<fn() -> K>,
}

impl<K: ArenaKey, T> Arena<K, T> {
    /// Create an empty arena with the default configuration.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            max_slots: ArenaConfig::DEFAULT_MAX_SLOTS,
            _key: PhantomData,
        }
    }

    /// Create an empty arena from a validated configuration.
    pub fn with_config(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            slots: Vec::with_capacity(config.initial_capacity as usize),
            free_list: Vec::new(),
            live: 0,
            max_slots: config.max_slots,
            _key: PhantomData,
        })
    }

    /// An empty arena with the same slot layout as `self`, every slot
    /// vacant and one generation ahead of its counterpart here.
    ///
    /// Keys issued by `self` never resolve in the successor, so values
    /// copied across with [`insert_at`](Self::insert_at) under
    /// [`successor_key`](Self::successor_key) cannot be confused with
    /// references that were left untranslated.
    pub fn vacant_successor(&self) -> Self {
        let slots: Vec<Slot<T>> = self
            .slots
            .iter()
            .map(|s| Slot {
                generation: s.generation.wrapping_add(1),
                value: None,
            })
            .collect();
        Self {
            free_list: (0..slots.len() as u32).rev().collect(),
            slots,
            live: 0,
            max_slots: self.max_slots,
            _key: PhantomData,
        }
    }

    /// The key a value stored under `key` gets in a
    /// [`vacant_successor`](Self::vacant_successor) arena.
    pub fn successor_key(key: K) -> K {
        K::new(key.slot(), key.generation().wrapping_add(1))
    }

    /// Place a value under an exact key.
    ///
    /// The slot must be vacant and its generation must not be newer than
    /// the key's. Slots past the end are created vacant as needed. Used
    /// when rebuilding an arena whose handles are already known (cloning,
    /// decoding).
    pub fn insert_at(&mut self, key: K, value: T) -> Result<(), ArenaError> {
        let index = key.slot();
        if index >= self.max_slots {
            return Err(ArenaError::CapacityExceeded {
                requested: index as usize + 1,
                capacity: self.max_slots as usize,
            });
        }
        while self.slots.len() <= index as usize {
            self.free_list.push(self.slots.len() as u32);
            self.slots.push(Slot {
                generation: 0,
                value: None,
            });
        }
        let slot = &mut self.slots[index as usize];
        if slot.value.is_some() || slot.generation > key.generation() {
            return Err(ArenaError::StaleHandle {
                slot: index,
                handle_generation: key.generation(),
                current_generation: Some(slot.generation),
            });
        }
        slot.generation = key.generation();
        slot.value = Some(value);
        self.live += 1;
        Ok(())
    }

    /// Insert a value, reusing a vacant slot when one is available.
    pub fn insert(&mut self, value: T) -> Result<K, ArenaError> {
        self.insert_with(|_| value)
    }

    /// Insert a value built from the key it will be stored under.
    ///
    /// Useful for objects that record their own handle.
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> T) -> Result<K, ArenaError> {
        // Entries filled by `insert_at` may still sit on the free list.
        while let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            if slot.value.is_some() {
                continue;
            }
            let key = K::new(index, slot.generation);
            slot.value = Some(build(key));
            self.live += 1;
            return Ok(key);
        }
        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&i| i < self.max_slots)
            .ok_or(ArenaError::CapacityExceeded {
                requested: self.slots.len() + 1,
                capacity: self.max_slots as usize,
            })?;
        let key = K::new(index, 0);
        self.slots.push(Slot {
            generation: 0,
            value: Some(build(key)),
        });
        self.live += 1;
        Ok(key)
    }

    fn slot(&self, key: K) -> Option<&Slot<T>> {
        self.slots
            .get(key.slot() as usize)
            .filter(|s| s.generation == key.generation())
    }

    /// Resolve a key. Returns `None` for stale or foreign keys.
    pub fn get(&self, key: K) -> Option<&T> {
        self.slot(key)?.value.as_ref()
    }

    /// Resolve a key mutably. Returns `None` for stale or foreign keys.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots
            .get_mut(key.slot() as usize)
            .filter(|s| s.generation == key.generation())?
            .value
            .as_mut()
    }

    /// Resolve a key, reporting staleness as an error.
    pub fn try_get(&self, key: K) -> Result<&T, ArenaError> {
        self.get(key).ok_or_else(|| self.stale(key))
    }

    /// Resolve a key mutably, reporting staleness as an error.
    pub fn try_get_mut(&mut self, key: K) -> Result<&mut T, ArenaError> {
        let err = self.stale(key);
        self.get_mut(key).ok_or(err)
    }

    fn stale(&self, key: K) -> ArenaError {
        ArenaError::StaleHandle {
            slot: key.slot(),
            handle_generation: key.generation(),
            current_generation: self.slots.get(key.slot() as usize).map(|s| s.generation),
        }
    }

    /// Whether the key resolves to a live value.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Remove and return the value, vacating its slot.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let slot = self
            .slots
            .get_mut(key.slot() as usize)
            .filter(|s| s.generation == key.generation())?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.slot());
        self.live -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live values.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slots (live + vacant).
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of vacant slots available for reuse.
    pub fn free_count(&self) -> usize {
        self.slots.len() - self.live
    }

    /// Iterate over live `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value
                .as_ref()
                .map(|v| (K::new(i as u32, s.generation), v))
        })
    }

    /// Iterate mutably over live `(key, value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value.as_mut().map(|v| (K::new(i as u32, generation), v))
        })
    }

    /// Iterate over live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Drop every value. Outstanding keys become stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(i as u32);
            }
        }
        self.live = 0;
    }
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T: Clone> Clone for Arena<K, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_list: self.free_list.clone(),
            live: self.live,
            max_slots: self.max_slots,
            _key: PhantomData,
        }
    }
}

impl<K, T> fmt::Debug for Arena<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live)
            .field("total_slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .field("max_slots", &self.max_slots)
            .finish()
    }
}
