use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Side table from local identifiers to kernel objects.
///
/// Callers hold plain `u64` identifiers instead of pointers into driver
/// state; the table is the only place an identifier is resolved. A slot can be
/// reserved before the kernel object exists and bound once it does.
///
/// Lookups only go from local id to kernel object. The kernel may hand out a
/// handle again as soon as it has been destroyed, so two slots can briefly
/// hold the same value.
pub struct HandleMap<H> {
    /// Local id -> kernel object (None while only reserved)
    slots: DashMap<u64, Option<H>>,
    /// Counter for generating unique local ids
    next_local: AtomicU64,
}

impl<H: Copy> HandleMap<H> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            // Start from 1 to avoid confusion with NULL/0 handles
            next_local: AtomicU64::new(1),
        }
    }

    /// Reserve an empty slot and return its local id.
    pub fn reserve(&self) -> u64 {
        let local = self.next_local.fetch_add(1, Ordering::Relaxed);
        self.slots.insert(local, None);
        local
    }

    /// Bind a kernel object to a reserved slot. Returns false if the slot is gone.
    pub fn bind(&self, local: u64, kernel: H) -> bool {
        match self.slots.get_mut(&local) {
            Some(mut slot) => {
                *slot = Some(kernel);
                true
            }
            None => false,
        }
    }

    /// Register a kernel object and return a new local id.
    pub fn insert(&self, kernel: H) -> u64 {
        let local = self.next_local.fetch_add(1, Ordering::Relaxed);
        self.slots.insert(local, Some(kernel));
        local
    }

    /// Look up a kernel object by local id.
    pub fn get(&self, local: u64) -> Option<H> {
        self.slots.get(&local).and_then(|v| *v)
    }

    pub fn contains(&self, local: u64) -> bool {
        self.slots.contains_key(&local)
    }

    /// Release a slot, bound or not. Returns the kernel object it held.
    pub fn remove(&self, local: u64) -> Option<H> {
        self.slots.remove(&local).and_then(|(_, kernel)| kernel)
    }

    /// Snapshot of every live local id.
    pub fn locals(&self) -> Vec<u64> {
        self.slots.iter().map(|e| *e.key()).collect()
    }

    /// Return number of live slots, including reserved ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<H: Copy> Default for HandleMap<H> {
    fn default() -> Self {
        Self::new()
    }
}
