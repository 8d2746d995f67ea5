//! Fixed-layout descriptors shared with the PowerVR DRM driver.
//!
//! Every struct here is `#[repr(C)]` and `Pod` so it can be handed to the
//! kernel by pointer. Field order and widths follow `drm/pvr_drm.h`.

use bytemuck::{Pod, Zeroable};

use crate::handle::{ContextHandle, SyncObjHandle, VmContextHandle};

/// Firmware context types accepted by CREATE_CONTEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ContextType {
    Render = 0,
    Compute = 1,
    TransferFrag = 2,
}

/// Job types accepted by SUBMIT_JOBS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum JobType {
    Geometry = 0,
    Fragment = 1,
    Compute = 2,
    TransferFrag = 3,
}

/// Scheduling priority of a firmware context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ContextPriority {
    Low = -512,
    Normal = 0,
    High = 512,
}

bitflags::bitflags! {
    /// `drm_pvr_sync_op.flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyncOpFlags: u32 {
        const HANDLE_TYPE_MASK              = 0x0000_000f;
        const HANDLE_TYPE_TIMELINE_SYNCOBJ  = 0x0000_0001;
        const SIGNAL                        = 1 << 31;
    }
}

impl SyncOpFlags {
    /// Binary syncobj handle type (value 0 in the handle-type nibble).
    pub const HANDLE_TYPE_SYNCOBJ: Self = Self::empty();
    /// A wait is the absence of the SIGNAL bit.
    pub const WAIT: Self = Self::empty();
}

bitflags::bitflags! {
    /// `drm_pvr_job.flags` for TRANSFER_FRAG jobs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransferJobFlags: u32 {
        const SINGLE_CORE = 1 << 0;
    }
}

/// Whether a sync operation is consumed before the job runs or produced after it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRole {
    Wait,
    Signal,
}

/// Narrow a byte or element count to the kernel's 32-bit length fields.
///
/// Panics when `len` does not fit: a wrapped length would describe a
/// different buffer than the one being handed over.
pub fn u32_len(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("length {} does not fit in a 32-bit kernel field", len),
    }
}

/// `struct drm_pvr_obj_array`: a typed user pointer with explicit stride and count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct ObjArray {
    pub stride: u32,
    pub count: u32,
    pub array: u64,
}

impl ObjArray {
    /// Point at `items`. The slice must outlive the ioctl that consumes this array.
    pub fn from_slice<T>(items: &[T]) -> Self {
        Self {
            stride: u32_len(std::mem::size_of::<T>()),
            count: u32_len(items.len()),
            array: if items.is_empty() { 0 } else { items.as_ptr() as u64 },
        }
    }
}

/// `struct drm_pvr_sync_op`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SyncOp {
    pub handle: u32,
    pub flags: u32,
    pub value: u64,
}

impl SyncOp {
    /// Wait on a binary syncobj before the job starts.
    pub fn wait(handle: SyncObjHandle) -> Self {
        Self {
            handle: handle.raw(),
            flags: (SyncOpFlags::WAIT | SyncOpFlags::HANDLE_TYPE_SYNCOBJ).bits(),
            value: 0,
        }
    }

    /// Signal a binary syncobj once the job completes.
    pub fn signal(handle: SyncObjHandle) -> Self {
        Self {
            handle: handle.raw(),
            flags: (SyncOpFlags::SIGNAL | SyncOpFlags::HANDLE_TYPE_SYNCOBJ).bits(),
            value: 0,
        }
    }

    pub fn flags(&self) -> SyncOpFlags {
        SyncOpFlags::from_bits_retain(self.flags)
    }

    pub fn role(&self) -> SyncRole {
        if self.flags().contains(SyncOpFlags::SIGNAL) {
            SyncRole::Signal
        } else {
            SyncRole::Wait
        }
    }

    pub fn sync_handle(&self) -> SyncObjHandle {
        SyncObjHandle(self.handle)
    }

    pub fn is_timeline(&self) -> bool {
        (self.flags() & SyncOpFlags::HANDLE_TYPE_MASK) == SyncOpFlags::HANDLE_TYPE_TIMELINE_SYNCOBJ
    }
}

/// `struct drm_pvr_hwrt_data_ref`. Unused by transfer jobs but part of the job layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct HwrtDataRef {
    pub set_handle: u32,
    pub data_index: u32,
}

/// `struct drm_pvr_job`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct DrmPvrJob {
    pub job_type: u32,
    pub context_handle: u32,
    pub flags: u32,
    pub cmd_stream_len: u32,
    pub cmd_stream: u64,
    pub sync_ops: ObjArray,
    pub hwrt: HwrtDataRef,
}

/// `struct drm_pvr_ioctl_submit_jobs_args`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SubmitJobsArgs {
    pub jobs: ObjArray,
}

/// `struct drm_pvr_ioctl_create_context_args`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CreateContextArgs {
    pub context_type: u32,
    pub flags: u32,
    pub priority: i32,
    /// Output: filled in by the kernel.
    pub handle: u32,
    pub static_context_state: u64,
    pub static_context_state_len: u32,
    pub vm_context_handle: u32,
    pub callstack_addr: u64,
}

impl CreateContextArgs {
    pub fn new(context_type: ContextType, priority: ContextPriority, vm_context: VmContextHandle) -> Self {
        Self {
            context_type: context_type as u32,
            priority: priority as i32,
            vm_context_handle: vm_context.raw(),
            ..Self::zeroed()
        }
    }

    pub fn context_handle(&self) -> ContextHandle {
        ContextHandle(self.handle)
    }
}

/// `struct drm_pvr_ioctl_destroy_context_args`. Also the layout of both VM-context ioctls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct HandleArgs {
    pub handle: u32,
    pub _padding_4: u32,
}

impl HandleArgs {
    pub fn new(handle: u32) -> Self {
        Self { handle, _padding_4: 0 }
    }
}

/// `struct drm_syncobj_create`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SyncobjCreateArgs {
    pub handle: u32,
    pub flags: u32,
}

/// `struct drm_syncobj_destroy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SyncobjDestroyArgs {
    pub handle: u32,
    pub pad: u32,
}

/// `struct drm_syncobj_wait`, without the optional trailing deadline field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SyncobjWaitArgs {
    pub handles: u64,
    pub timeout_nsec: i64,
    pub count_handles: u32,
    pub flags: u32,
    pub first_signaled: u32,
    pub pad: u32,
}

pub const DRM_SYNCOBJ_WAIT_FLAGS_WAIT_ALL: u32 = 1 << 0;
pub const DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT: u32 = 1 << 1;
