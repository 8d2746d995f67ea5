//! The kernel job scheduler as seen from userspace.
//!
//! [`KernelScheduler`] is the whole ioctl surface the winsys consumes. The DRM
//! render-node implementation lives in [`crate::drm`]; tests substitute a
//! recording fake.

use std::time::Duration;

use pvr_uapi::job::{u32_len, CreateContextArgs, DrmPvrJob, HwrtDataRef, ObjArray};
use pvr_uapi::{ContextHandle, IoctlError, JobType, SyncObjHandle, SyncOp, VmContextHandle};

/// One unit of GPU work plus its sync dependencies.
///
/// Borrowed for the duration of a single submission; the kernel copies
/// everything it needs before `submit_jobs` returns.
#[derive(Debug, Clone, Copy)]
pub struct JobDescriptor<'a> {
    pub job_type: JobType,
    pub context: ContextHandle,
    /// Job-type specific `drm_pvr_job.flags` bits.
    pub flags: u32,
    pub cmd_stream: &'a [u8],
    pub sync_ops: &'a [SyncOp],
}

impl JobDescriptor<'_> {
    /// Lower into the kernel layout. The result points into `self` and must not outlive it.
    pub fn to_drm(&self) -> DrmPvrJob {
        DrmPvrJob {
            job_type: self.job_type as u32,
            context_handle: self.context.raw(),
            flags: self.flags,
            cmd_stream_len: u32_len(self.cmd_stream.len()),
            cmd_stream: self.cmd_stream.as_ptr() as u64,
            sync_ops: ObjArray::from_slice(self.sync_ops),
            hwrt: HwrtDataRef::default(),
        }
    }
}

/// Kernel-side context and job scheduling.
///
/// Every call either fully succeeds or has no effect; implementations must not
/// retry on behalf of the caller.
pub trait KernelScheduler: Send + Sync {
    fn create_vm_context(&self) -> Result<VmContextHandle, IoctlError>;

    fn destroy_vm_context(&self, vm_context: VmContextHandle) -> Result<(), IoctlError>;

    /// Create a firmware context. `args.handle` is ignored on input.
    fn create_context(&self, args: CreateContextArgs) -> Result<ContextHandle, IoctlError>;

    fn destroy_context(&self, context: ContextHandle) -> Result<(), IoctlError>;

    /// Submit a batch of jobs atomically.
    fn submit_jobs(&self, jobs: &[JobDescriptor<'_>]) -> Result<(), IoctlError>;

    fn syncobj_create(&self) -> Result<SyncObjHandle, IoctlError>;

    fn syncobj_destroy(&self, handle: SyncObjHandle) -> Result<(), IoctlError>;

    /// Block until every handle is signaled or `timeout` elapses.
    fn syncobj_wait(&self, handles: &[SyncObjHandle], timeout: Duration) -> Result<(), IoctlError>;
}
