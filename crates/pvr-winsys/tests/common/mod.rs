//! Recording fake of the kernel scheduler.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use pvr_uapi::job::CreateContextArgs;
use pvr_uapi::{ContextHandle, IoctlError, JobType, SyncObjHandle, SyncOp, VmContextHandle};
use pvr_winsys::{JobDescriptor, KernelScheduler, Winsys};

/// Owned copy of a submitted job, taken while the descriptor is still borrowed.
#[derive(Debug, Clone)]
pub struct RecordedJob {
    pub job_type: JobType,
    pub context: ContextHandle,
    pub flags: u32,
    pub cmd_stream: Vec<u8>,
    pub sync_ops: Vec<SyncOp>,
}

#[derive(Default)]
pub struct FakeScheduler {
    next_handle: AtomicU32,
    /// Every kernel call, in order, by request name
    pub calls: Mutex<Vec<&'static str>>,
    pub created_contexts: Mutex<Vec<CreateContextArgs>>,
    pub destroyed_contexts: Mutex<Vec<ContextHandle>>,
    /// Each submit_jobs call as one batch
    pub batches: Mutex<Vec<Vec<RecordedJob>>>,
    pub destroyed_syncobjs: Mutex<Vec<SyncObjHandle>>,
    pub fail_create_vm_context: Mutex<Option<i32>>,
    pub fail_create_context: Mutex<Option<i32>>,
    pub fail_destroy_context: Mutex<Option<i32>>,
    pub fail_submit: Mutex<Option<i32>>,
    pub fail_wait: Mutex<Option<i32>>,
}

impl FakeScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_handle: AtomicU32::new(1),
            ..Self::default()
        })
    }

    fn next(&self) -> u32 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    pub fn last_batch(&self) -> Vec<RecordedJob> {
        self.batches.lock().last().cloned().expect("no submission recorded")
    }
}

impl KernelScheduler for FakeScheduler {
    fn create_vm_context(&self) -> Result<VmContextHandle, IoctlError> {
        self.record("CREATE_VM_CONTEXT");
        if let Some(errno) = *self.fail_create_vm_context.lock() {
            return Err(IoctlError::new("CREATE_VM_CONTEXT", errno));
        }
        Ok(VmContextHandle(self.next()))
    }

    fn destroy_vm_context(&self, _vm_context: VmContextHandle) -> Result<(), IoctlError> {
        self.record("DESTROY_VM_CONTEXT");
        Ok(())
    }

    fn create_context(&self, args: CreateContextArgs) -> Result<ContextHandle, IoctlError> {
        self.record("CREATE_CONTEXT");
        self.created_contexts.lock().push(args);
        if let Some(errno) = *self.fail_create_context.lock() {
            return Err(IoctlError::new("CREATE_CONTEXT", errno));
        }
        Ok(ContextHandle(self.next()))
    }

    fn destroy_context(&self, context: ContextHandle) -> Result<(), IoctlError> {
        self.record("DESTROY_CONTEXT");
        self.destroyed_contexts.lock().push(context);
        if let Some(errno) = *self.fail_destroy_context.lock() {
            return Err(IoctlError::new("DESTROY_CONTEXT", errno));
        }
        Ok(())
    }

    fn submit_jobs(&self, jobs: &[JobDescriptor<'_>]) -> Result<(), IoctlError> {
        self.record("SUBMIT_JOBS");
        if let Some(errno) = *self.fail_submit.lock() {
            return Err(IoctlError::new("SUBMIT_JOBS", errno));
        }
        let batch = jobs
            .iter()
            .map(|job| RecordedJob {
                job_type: job.job_type,
                context: job.context,
                flags: job.flags,
                cmd_stream: job.cmd_stream.to_vec(),
                sync_ops: job.sync_ops.to_vec(),
            })
            .collect();
        self.batches.lock().push(batch);
        Ok(())
    }

    fn syncobj_create(&self) -> Result<SyncObjHandle, IoctlError> {
        self.record("SYNCOBJ_CREATE");
        Ok(SyncObjHandle(self.next()))
    }

    fn syncobj_destroy(&self, handle: SyncObjHandle) -> Result<(), IoctlError> {
        self.record("SYNCOBJ_DESTROY");
        self.destroyed_syncobjs.lock().push(handle);
        Ok(())
    }

    fn syncobj_wait(&self, _handles: &[SyncObjHandle], _timeout: Duration) -> Result<(), IoctlError> {
        self.record("SYNCOBJ_WAIT");
        if let Some(errno) = *self.fail_wait.lock() {
            return Err(IoctlError::new("SYNCOBJ_WAIT", errno));
        }
        Ok(())
    }
}

/// A winsys over a fresh fake, plus the fake for inspection.
pub fn make_winsys() -> (Arc<Winsys>, Arc<FakeScheduler>) {
    let fake = FakeScheduler::new();
    let winsys = Winsys::new(fake.clone()).expect("winsys creation");
    (winsys, fake)
}
