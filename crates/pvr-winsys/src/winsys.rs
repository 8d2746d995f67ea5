use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use pvr_core::config::{ContextPriorityConfig, DeviceConfig};
use pvr_core::error::ioctl_or;
use pvr_core::{HandleMap, WinsysError, WinsysResult};
use pvr_uapi::job::ContextPriority;
use pvr_uapi::{ContextHandle, VmContextHandle};

use crate::drm::DrmScheduler;
use crate::scheduler::KernelScheduler;
use crate::sync::{SyncFlags, SyncId, SyncPrimitive};

/// Driver-facing context priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WinsysPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl WinsysPriority {
    pub fn to_drm(self) -> ContextPriority {
        match self {
            WinsysPriority::Low => ContextPriority::Low,
            WinsysPriority::Medium => ContextPriority::Normal,
            WinsysPriority::High => ContextPriority::High,
        }
    }
}

impl From<ContextPriorityConfig> for WinsysPriority {
    fn from(p: ContextPriorityConfig) -> Self {
        match p {
            ContextPriorityConfig::Low => WinsysPriority::Low,
            ContextPriorityConfig::Medium => WinsysPriority::Medium,
            ContextPriorityConfig::High => WinsysPriority::High,
        }
    }
}

/// One open device: the kernel scheduler, the GPU virtual-memory context every
/// firmware context is created in, and the side tables resolving local ids.
pub struct Winsys {
    scheduler: Arc<dyn KernelScheduler>,
    vm_context: VmContextHandle,
    /// Live transfer contexts, reserved before the kernel object exists
    contexts: HandleMap<ContextHandle>,
    /// Sync primitives created through this winsys
    syncs: HandleMap<SyncPrimitive>,
}

impl Winsys {
    /// Wrap a scheduler and create the device's VM context.
    pub fn new(scheduler: Arc<dyn KernelScheduler>) -> WinsysResult<Arc<Self>> {
        let vm_context = ioctl_or(
            scheduler.create_vm_context(),
            WinsysError::InitializationFailed,
            "Failed to create VM context",
        )?;
        debug!("created {}", vm_context);

        Ok(Arc::new(Self {
            scheduler,
            vm_context,
            contexts: HandleMap::new(),
            syncs: HandleMap::new(),
        }))
    }

    /// Open the configured render node.
    pub fn open(config: &DeviceConfig) -> WinsysResult<Arc<Self>> {
        let scheduler = DrmScheduler::open(&config.render_node)?;
        info!("using render node {}", scheduler.path());
        Self::new(Arc::new(scheduler))
    }

    pub fn scheduler(&self) -> &dyn KernelScheduler {
        self.scheduler.as_ref()
    }

    pub fn vm_context(&self) -> VmContextHandle {
        self.vm_context
    }

    pub(crate) fn contexts(&self) -> &HandleMap<ContextHandle> {
        &self.contexts
    }

    /// Number of transfer contexts currently holding a slot.
    pub fn live_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Create a sync object and register it.
    pub fn create_sync(&self, flags: SyncFlags) -> WinsysResult<SyncId> {
        let handle = ioctl_or(
            self.scheduler.syncobj_create(),
            |_| WinsysError::OutOfHostMemory,
            "DRM_IOCTL_SYNCOBJ_CREATE failed",
        )?;
        let id = SyncId(self.syncs.insert(SyncPrimitive { handle, flags }));
        debug!("created {} as {:?}", handle, id);
        Ok(id)
    }

    pub fn sync(&self, id: SyncId) -> Option<SyncPrimitive> {
        self.syncs.get(id.0)
    }

    /// Unregister a sync object and destroy it. The kernel call is best-effort.
    pub fn destroy_sync(&self, id: SyncId) -> WinsysResult<()> {
        let sync = self
            .syncs
            .remove(id.0)
            .ok_or_else(|| WinsysError::HandleNotFound(format!("{:?}", id)))?;
        if let Err(e) = self.scheduler.syncobj_destroy(sync.handle) {
            warn!("failed to destroy {}: {}", sync.handle, e);
        }
        Ok(())
    }

    /// Block until every listed sync object has been signaled.
    pub fn wait_syncs(&self, ids: &[SyncId], timeout: Duration) -> WinsysResult<()> {
        let handles = ids
            .iter()
            .map(|id| {
                self.sync(*id)
                    .map(|s| s.handle)
                    .ok_or_else(|| WinsysError::HandleNotFound(format!("{:?}", id)))
            })
            .collect::<WinsysResult<Vec<_>>>()?;

        match self.scheduler.syncobj_wait(&handles, timeout) {
            Ok(()) => Ok(()),
            Err(e) if e.errno == libc::ETIME || e.errno == libc::ETIMEDOUT => Err(WinsysError::Timeout),
            Err(e) => ioctl_or(Err(e), WinsysError::Unknown, "DRM_IOCTL_SYNCOBJ_WAIT failed"),
        }
    }
}

impl Drop for Winsys {
    fn drop(&mut self) {
        for id in self.syncs.locals() {
            if let Some(sync) = self.syncs.remove(id) {
                if let Err(e) = self.scheduler.syncobj_destroy(sync.handle) {
                    warn!("failed to destroy {}: {}", sync.handle, e);
                }
            }
        }
        if let Err(e) = self.scheduler.destroy_vm_context(self.vm_context) {
            warn!("failed to destroy {}: {}", self.vm_context, e);
        }
    }
}
