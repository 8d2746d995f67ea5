//! Sync primitives referenced by submissions, and the fixed-capacity sync-op list.

use pvr_uapi::{SyncObjHandle, SyncOp};

bitflags::bitflags! {
    /// Capabilities of a sync primitive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyncFlags: u32 {
        /// Supports monotonically increasing wait/signal values.
        const TIMELINE = 1 << 0;
    }
}

/// A kernel-visible semaphore-like object.
///
/// Owned by the caller; submissions only read its handle and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncPrimitive {
    pub handle: SyncObjHandle,
    pub flags: SyncFlags,
}

impl SyncPrimitive {
    pub fn binary(handle: SyncObjHandle) -> Self {
        Self {
            handle,
            flags: SyncFlags::empty(),
        }
    }

    pub fn timeline(handle: SyncObjHandle) -> Self {
        Self {
            handle,
            flags: SyncFlags::TIMELINE,
        }
    }

    pub fn is_timeline(&self) -> bool {
        self.flags.contains(SyncFlags::TIMELINE)
    }
}

/// Local identifier of a sync primitive registered with a [`crate::Winsys`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncId(pub u64);

/// Most sync operations a single job carries: one wait, one signal.
pub const MAX_SYNC_OPS: usize = 2;

/// Inline, fixed-capacity list of sync operations for one job.
#[derive(Debug, Clone, Copy)]
pub struct SyncOpList {
    ops: [SyncOp; MAX_SYNC_OPS],
    len: usize,
}

impl SyncOpList {
    pub fn new() -> Self {
        Self {
            ops: [SyncOp::default(); MAX_SYNC_OPS],
            len: 0,
        }
    }

    /// Append an operation. Panics when the list is full.
    pub fn push(&mut self, op: SyncOp) {
        assert!(self.len < MAX_SYNC_OPS, "a job carries at most {} sync ops", MAX_SYNC_OPS);
        self.ops[self.len] = op;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[SyncOp] {
        &self.ops[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SyncOpList {
    fn default() -> Self {
        Self::new()
    }
}
