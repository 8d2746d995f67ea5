//! Transfer (fragment) contexts and job submission.

use std::sync::Arc;

use tracing::debug;

use pvr_core::error::ioctl_or;
use pvr_core::{WinsysError, WinsysResult};
use pvr_uapi::job::{u32_len, ContextType, CreateContextArgs};
use pvr_uapi::{ContextHandle, JobType, SyncOp, TransferJobFlags};

use crate::scheduler::JobDescriptor;
use crate::sync::{SyncOpList, SyncPrimitive};
use crate::winsys::{Winsys, WinsysPriority};

bitflags::bitflags! {
    /// Driver-level execution flags of one transfer command.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TransferCmdFlags: u32 {
        const USE_SINGLE_CORE = 1 << 0;
    }
}

/// Translate command flags into the kernel encoding. Flags the kernel has no bit for are dropped.
pub fn transfer_flags_to_drm(flags: TransferCmdFlags) -> TransferJobFlags {
    let mut drm_flags = TransferJobFlags::empty();

    if flags.contains(TransferCmdFlags::USE_SINGLE_CORE) {
        drm_flags |= TransferJobFlags::SINGLE_CORE;
    }

    drm_flags
}

/// One firmware command stream.
#[derive(Debug, Clone, Copy)]
pub struct TransferCmd<'a> {
    pub fw_stream: &'a [u8],
    pub flags: TransferCmdFlags,
}

#[derive(Debug, Clone, Copy)]
pub struct TransferSubmitInfo<'a> {
    /// Must hold exactly one command.
    pub cmds: &'a [TransferCmd<'a>],
    /// Binary primitive to wait on before the stream executes.
    pub wait: Option<&'a SyncPrimitive>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransferContextCreateInfo {
    pub priority: WinsysPriority,
}

/// A kernel-scheduled transfer queue.
///
/// Holds its winsys alive, so the device outlives every job submitted here.
/// Dropping an undestroyed context tears it down the same way [`destroy`](Self::destroy) does.
pub struct TransferContext {
    winsys: Arc<Winsys>,
    slot: u64,
    handle: ContextHandle,
    destroyed: bool,
}

impl TransferContext {
    pub fn create(winsys: &Arc<Winsys>, create_info: &TransferContextCreateInfo) -> WinsysResult<Self> {
        let slot = winsys.contexts().reserve();

        let args = CreateContextArgs::new(
            ContextType::TransferFrag,
            create_info.priority.to_drm(),
            winsys.vm_context(),
        );

        let handle = match ioctl_or(
            winsys.scheduler().create_context(args),
            WinsysError::InitializationFailed,
            "Failed to create transfer context",
        ) {
            Ok(handle) => handle,
            Err(e) => {
                winsys.contexts().remove(slot);
                return Err(e);
            }
        };

        let bound = winsys.contexts().bind(slot, handle);
        debug_assert!(bound, "context slot released before it was bound");
        debug!("created transfer {} (priority {:?})", handle, create_info.priority);

        Ok(Self {
            winsys: Arc::clone(winsys),
            slot,
            handle,
            destroyed: false,
        })
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    pub fn winsys(&self) -> &Arc<Winsys> {
        &self.winsys
    }

    /// Destroy the kernel context and release its slot.
    ///
    /// The slot is released even when the kernel rejects the destroy; the
    /// rejection is still reported as [`WinsysError::Unknown`].
    pub fn destroy(mut self) -> WinsysResult<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> WinsysResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;

        let result = ioctl_or(
            self.winsys.scheduler().destroy_context(self.handle),
            WinsysError::Unknown,
            "Error destroying transfer context",
        );
        self.winsys.contexts().remove(self.slot);
        debug!("destroyed transfer {}", self.handle);
        result
    }

    /// Submit one transfer command.
    ///
    /// `submit_info.wait` is waited on before the stream starts; `signal_sync`
    /// is signaled by the kernel once it completes. Nothing here blocks on the GPU.
    ///
    /// Panics if `submit_info` does not hold exactly one command, if its stream
    /// is 4 GiB or longer, or if either primitive is a timeline: this job type
    /// only takes binary syncobjs.
    pub fn submit(
        &self,
        submit_info: &TransferSubmitInfo<'_>,
        signal_sync: Option<&SyncPrimitive>,
    ) -> WinsysResult<()> {
        assert_eq!(submit_info.cmds.len(), 1, "transfer submissions carry exactly one command");
        let cmd = &submit_info.cmds[0];
        u32_len(cmd.fw_stream.len());

        let mut sync_ops = SyncOpList::new();

        if let Some(wait) = submit_info.wait {
            assert!(!wait.is_timeline(), "transfer jobs cannot wait on a timeline sync primitive");
            sync_ops.push(SyncOp::wait(wait.handle));
        }

        if let Some(signal) = signal_sync {
            assert!(!signal.is_timeline(), "transfer jobs cannot signal a timeline sync primitive");
            sync_ops.push(SyncOp::signal(signal.handle));
        }

        let job = JobDescriptor {
            job_type: JobType::TransferFrag,
            context: self.handle,
            flags: transfer_flags_to_drm(cmd.flags).bits(),
            cmd_stream: cmd.fw_stream,
            sync_ops: sync_ops.as_slice(),
        };

        debug!(
            "submitting transfer job on {}: {} byte stream, {} sync op(s)",
            self.handle,
            cmd.fw_stream.len(),
            sync_ops.len()
        );

        // Compatibility shim: every rejection is reported as out of device
        // memory, matching the pvrsrv winsys callers were written against.
        ioctl_or(
            self.winsys.scheduler().submit_jobs(std::slice::from_ref(&job)),
            WinsysError::OutOfDeviceMemory,
            "Failed to submit transfer job",
        )
    }
}

impl Drop for TransferContext {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}
