pub mod handle;
pub mod job;
pub mod ioctl;
pub mod error;

pub use handle::{ContextHandle, SyncObjHandle, VmContextHandle};
pub use job::{JobType, SyncOp, SyncOpFlags, SyncRole, TransferJobFlags};
pub use error::IoctlError;
