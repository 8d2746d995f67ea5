pub mod drm;
pub mod scheduler;
pub mod sync;
pub mod transfer;
pub mod winsys;

pub use scheduler::{JobDescriptor, KernelScheduler};
pub use sync::{SyncFlags, SyncId, SyncPrimitive};
pub use transfer::{TransferCmd, TransferCmdFlags, TransferContext, TransferContextCreateInfo, TransferSubmitInfo};
pub use winsys::{Winsys, WinsysPriority};
