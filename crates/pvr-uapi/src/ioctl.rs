use crate::job::{CreateContextArgs, HandleArgs, SubmitJobsArgs, SyncobjCreateArgs, SyncobjDestroyArgs, SyncobjWaitArgs};

/// DRM ioctl type byte: 'd'
pub const DRM_IOCTL_BASE: u32 = 0x64;

/// First driver-private ioctl number.
pub const DRM_COMMAND_BASE: u32 = 0x40;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, nr: u32, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)
        | (DRM_IOCTL_BASE << IOC_TYPESHIFT)
        | (nr << IOC_NRSHIFT)
}

const fn iow<T>(nr: u32) -> u32 {
    ioc(IOC_WRITE, nr, std::mem::size_of::<T>())
}

const fn iowr<T>(nr: u32) -> u32 {
    ioc(IOC_READ | IOC_WRITE, nr, std::mem::size_of::<T>())
}

// Driver-private ioctl numbers, relative to DRM_COMMAND_BASE.
const PVR_CREATE_VM_CONTEXT: u32 = 0x03;
const PVR_DESTROY_VM_CONTEXT: u32 = 0x04;
const PVR_CREATE_CONTEXT: u32 = 0x07;
const PVR_DESTROY_CONTEXT: u32 = 0x08;
const PVR_SUBMIT_JOBS: u32 = 0x0d;

pub const DRM_IOCTL_PVR_CREATE_VM_CONTEXT: u32 =
    iowr::<HandleArgs>(DRM_COMMAND_BASE + PVR_CREATE_VM_CONTEXT);
pub const DRM_IOCTL_PVR_DESTROY_VM_CONTEXT: u32 =
    iow::<HandleArgs>(DRM_COMMAND_BASE + PVR_DESTROY_VM_CONTEXT);
pub const DRM_IOCTL_PVR_CREATE_CONTEXT: u32 =
    iowr::<CreateContextArgs>(DRM_COMMAND_BASE + PVR_CREATE_CONTEXT);
pub const DRM_IOCTL_PVR_DESTROY_CONTEXT: u32 =
    iow::<HandleArgs>(DRM_COMMAND_BASE + PVR_DESTROY_CONTEXT);
pub const DRM_IOCTL_PVR_SUBMIT_JOBS: u32 =
    iow::<SubmitJobsArgs>(DRM_COMMAND_BASE + PVR_SUBMIT_JOBS);

// Core DRM syncobj ioctls.
pub const DRM_IOCTL_SYNCOBJ_CREATE: u32 = iowr::<SyncobjCreateArgs>(0xBF);
pub const DRM_IOCTL_SYNCOBJ_DESTROY: u32 = iowr::<SyncobjDestroyArgs>(0xC0);
pub const DRM_IOCTL_SYNCOBJ_WAIT: u32 = iowr::<SyncobjWaitArgs>(0xC3);
