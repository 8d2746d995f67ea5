//! [`KernelScheduler`] over a PowerVR DRM render node.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::time::Duration;

use bytemuck::Pod;
use tracing::{debug, trace};

use pvr_uapi::ioctl::*;
use pvr_uapi::job::{
    u32_len, CreateContextArgs, DrmPvrJob, HandleArgs, ObjArray, SubmitJobsArgs, SyncobjCreateArgs,
    SyncobjDestroyArgs, SyncobjWaitArgs, DRM_SYNCOBJ_WAIT_FLAGS_WAIT_ALL,
    DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT,
};
use pvr_uapi::{ContextHandle, IoctlError, SyncObjHandle, VmContextHandle};

use crate::scheduler::{JobDescriptor, KernelScheduler};

pub struct DrmScheduler {
    file: File,
    path: String,
}

impl DrmScheduler {
    /// Open a render node read/write.
    pub fn open(path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("opened render node {} (fd {})", path, file.as_raw_fd());
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Issue one ioctl. Like libdrm's `drmIoctl`, an interrupted call is restarted.
    fn ioctl<T: Pod>(&self, request: u32, name: &'static str, arg: &mut T) -> Result<(), IoctlError> {
        loop {
            // SAFETY: `arg` is a live, exclusively borrowed `#[repr(C)]` struct whose
            // size is encoded in `request`; any user pointers inside it are kept alive
            // by the caller for the duration of this call.
            let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg as *mut T) };
            if ret != -1 {
                trace!("{} ok", name);
                return Ok(());
            }
            let err = IoctlError::last_os_error(name);
            if err.errno != libc::EINTR && err.errno != libc::EAGAIN {
                return Err(err);
            }
        }
    }
}

/// Convert a relative timeout into the absolute CLOCK_MONOTONIC deadline the syncobj ioctls expect.
fn abs_timeout_ns(timeout: Duration) -> i64 {
    let mut now = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    // SAFETY: `now` is a valid, writable timespec.
    unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut now) };
    let now_ns = (now.tv_sec as i64)
        .saturating_mul(1_000_000_000)
        .saturating_add(now.tv_nsec as i64);
    let timeout_ns = i64::try_from(timeout.as_nanos()).unwrap_or(i64::MAX);
    now_ns.saturating_add(timeout_ns)
}

impl KernelScheduler for DrmScheduler {
    fn create_vm_context(&self) -> Result<VmContextHandle, IoctlError> {
        let mut args = HandleArgs::default();
        self.ioctl(DRM_IOCTL_PVR_CREATE_VM_CONTEXT, "CREATE_VM_CONTEXT", &mut args)?;
        Ok(VmContextHandle(args.handle))
    }

    fn destroy_vm_context(&self, vm_context: VmContextHandle) -> Result<(), IoctlError> {
        let mut args = HandleArgs::new(vm_context.raw());
        self.ioctl(DRM_IOCTL_PVR_DESTROY_VM_CONTEXT, "DESTROY_VM_CONTEXT", &mut args)
    }

    fn create_context(&self, args: CreateContextArgs) -> Result<ContextHandle, IoctlError> {
        let mut args = CreateContextArgs { handle: 0, ..args };
        self.ioctl(DRM_IOCTL_PVR_CREATE_CONTEXT, "CREATE_CONTEXT", &mut args)?;
        Ok(args.context_handle())
    }

    fn destroy_context(&self, context: ContextHandle) -> Result<(), IoctlError> {
        let mut args = HandleArgs::new(context.raw());
        self.ioctl(DRM_IOCTL_PVR_DESTROY_CONTEXT, "DESTROY_CONTEXT", &mut args)
    }

    fn submit_jobs(&self, jobs: &[JobDescriptor<'_>]) -> Result<(), IoctlError> {
        // The lowered jobs borrow the descriptors' streams and sync-op arrays.
        let drm_jobs: Vec<DrmPvrJob> = jobs.iter().map(JobDescriptor::to_drm).collect();
        let mut args = SubmitJobsArgs {
            jobs: ObjArray::from_slice(&drm_jobs),
        };
        self.ioctl(DRM_IOCTL_PVR_SUBMIT_JOBS, "SUBMIT_JOBS", &mut args)
    }

    fn syncobj_create(&self) -> Result<SyncObjHandle, IoctlError> {
        let mut args = SyncobjCreateArgs::default();
        self.ioctl(DRM_IOCTL_SYNCOBJ_CREATE, "SYNCOBJ_CREATE", &mut args)?;
        Ok(SyncObjHandle(args.handle))
    }

    fn syncobj_destroy(&self, handle: SyncObjHandle) -> Result<(), IoctlError> {
        let mut args = SyncobjDestroyArgs {
            handle: handle.raw(),
            pad: 0,
        };
        self.ioctl(DRM_IOCTL_SYNCOBJ_DESTROY, "SYNCOBJ_DESTROY", &mut args)
    }

    fn syncobj_wait(&self, handles: &[SyncObjHandle], timeout: Duration) -> Result<(), IoctlError> {
        if handles.is_empty() {
            return Ok(());
        }
        let raw: Vec<u32> = handles.iter().map(SyncObjHandle::raw).collect();
        let mut args = SyncobjWaitArgs {
            handles: raw.as_ptr() as u64,
            timeout_nsec: abs_timeout_ns(timeout),
            count_handles: u32_len(raw.len()),
            flags: DRM_SYNCOBJ_WAIT_FLAGS_WAIT_ALL | DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT,
            ..SyncobjWaitArgs::default()
        };
        self.ioctl(DRM_IOCTL_SYNCOBJ_WAIT, "SYNCOBJ_WAIT", &mut args)
    }
}
