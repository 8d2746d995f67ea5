//! Integration test: transfer job submission
//!
//! Verifies the sync-op list, flag translation, and error mapping of
//! TransferContext::submit against a recording fake scheduler.

mod common;

use std::sync::Arc;

use common::make_winsys;
use pvr_core::WinsysError;
use pvr_uapi::{JobType, SyncObjHandle, SyncRole, TransferJobFlags};
use pvr_winsys::transfer::transfer_flags_to_drm;
use pvr_winsys::{
    SyncPrimitive, TransferCmd, TransferCmdFlags, TransferContext, TransferContextCreateInfo,
    TransferSubmitInfo,
};

const STREAM: [u8; 12] = [0xA5; 12];

fn single_cmd(flags: TransferCmdFlags) -> [TransferCmd<'static>; 1] {
    [TransferCmd {
        fw_stream: &STREAM,
        flags,
    }]
}

fn make_context() -> (TransferContext, Arc<common::FakeScheduler>) {
    let (winsys, fake) = make_winsys();
    let ctx = TransferContext::create(&winsys, &TransferContextCreateInfo::default())
        .expect("context creation");
    (ctx, fake)
}

#[test]
fn test_submit_without_sync() {
    let (ctx, fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());

    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, None)
        .expect("submission");

    let batch = fake.last_batch();
    assert_eq!(batch.len(), 1, "always a batch of one");
    let job = &batch[0];
    assert_eq!(job.job_type, JobType::TransferFrag);
    assert_eq!(job.context, ctx.handle());
    assert_eq!(job.cmd_stream, STREAM.to_vec());
    assert_eq!(job.flags, 0);
    assert!(job.sync_ops.is_empty());
}

#[test]
fn test_submit_signal_only() {
    let (ctx, fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());
    let signal = SyncPrimitive::binary(SyncObjHandle(77));

    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, Some(&signal))
        .expect("submission");

    let job = &fake.last_batch()[0];
    assert_eq!(job.sync_ops.len(), 1);
    assert_eq!(job.sync_ops[0].role(), SyncRole::Signal);
    assert_eq!(job.sync_ops[0].sync_handle(), SyncObjHandle(77));
    assert_eq!(job.sync_ops[0].value, 0);
}

#[test]
fn test_submit_wait_only() {
    let (ctx, fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());
    let wait = SyncPrimitive::binary(SyncObjHandle(5));

    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: Some(&wait) }, None)
        .expect("submission");

    let job = &fake.last_batch()[0];
    assert_eq!(job.sync_ops.len(), 1);
    assert_eq!(job.sync_ops[0].role(), SyncRole::Wait);
    assert_eq!(job.sync_ops[0].sync_handle(), SyncObjHandle(5));
}

#[test]
fn test_submit_wait_and_signal() {
    let (ctx, fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());
    let wait = SyncPrimitive::binary(SyncObjHandle(5));
    let signal = SyncPrimitive::binary(SyncObjHandle(6));

    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: Some(&wait) }, Some(&signal))
        .expect("submission");

    let job = &fake.last_batch()[0];
    assert_eq!(job.sync_ops.len(), 2);
    let waits: Vec<_> = job.sync_ops.iter().filter(|op| op.role() == SyncRole::Wait).collect();
    let signals: Vec<_> = job.sync_ops.iter().filter(|op| op.role() == SyncRole::Signal).collect();
    assert_eq!(waits.len(), 1);
    assert_eq!(signals.len(), 1);
    assert_eq!(waits[0].sync_handle(), SyncObjHandle(5));
    assert_eq!(signals[0].sync_handle(), SyncObjHandle(6));
    assert!(job.sync_ops.iter().all(|op| !op.is_timeline() && op.value == 0));
}

#[test]
fn test_single_core_flag() {
    let (ctx, fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::USE_SINGLE_CORE);

    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, None)
        .expect("submission");

    assert_eq!(fake.last_batch()[0].flags, TransferJobFlags::SINGLE_CORE.bits());
}

#[test]
fn test_unknown_flags_are_dropped() {
    let flags = TransferCmdFlags::from_bits_retain(0x8000_0000);
    assert_eq!(transfer_flags_to_drm(flags), TransferJobFlags::empty());

    let flags = TransferCmdFlags::from_bits_retain(0x8000_0000) | TransferCmdFlags::USE_SINGLE_CORE;
    assert_eq!(transfer_flags_to_drm(flags), TransferJobFlags::SINGLE_CORE);
}

#[test]
fn test_submit_failure_maps_to_out_of_device_memory() {
    for errno in [libc::EINVAL, libc::ENOMEM, libc::EBUSY, libc::EFAULT] {
        let (ctx, fake) = make_context();
        *fake.fail_submit.lock() = Some(errno);
        let cmds = single_cmd(TransferCmdFlags::empty());

        match ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, None) {
            Err(WinsysError::OutOfDeviceMemory(e)) => assert_eq!(e.errno, errno),
            other => panic!("errno {}: expected OutOfDeviceMemory, got {:?}", errno, other),
        }
        assert_eq!(fake.count_of("SUBMIT_JOBS"), 1, "no retry after a rejected submission");
    }
}

#[test]
#[should_panic(expected = "timeline")]
fn test_timeline_wait_is_rejected() {
    let (ctx, _fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());
    let wait = SyncPrimitive::timeline(SyncObjHandle(5));
    let _ = ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: Some(&wait) }, None);
}

#[test]
#[should_panic(expected = "timeline")]
fn test_timeline_signal_is_rejected() {
    let (ctx, _fake) = make_context();
    let cmds = single_cmd(TransferCmdFlags::empty());
    let signal = SyncPrimitive::timeline(SyncObjHandle(6));
    let _ = ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, Some(&signal));
}

#[test]
fn test_timeline_rejected_before_kernel_call() {
    let (ctx, fake) = make_context();
    let before = fake.call_count();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let cmds = single_cmd(TransferCmdFlags::empty());
        let wait = SyncPrimitive::binary(SyncObjHandle(5));
        let signal = SyncPrimitive::timeline(SyncObjHandle(6));
        let _ = ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: Some(&wait) }, Some(&signal));
    }));

    assert!(result.is_err(), "timeline signal must be a contract violation");
    assert_eq!(fake.call_count(), before, "no kernel call may be issued");
}

#[test]
#[should_panic(expected = "exactly one command")]
fn test_two_commands_are_rejected() {
    let (ctx, _fake) = make_context();
    let cmds = [
        TransferCmd { fw_stream: &STREAM, flags: TransferCmdFlags::empty() },
        TransferCmd { fw_stream: &STREAM, flags: TransferCmdFlags::empty() },
    ];
    let _ = ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, None);
}

#[test]
#[should_panic(expected = "exactly one command")]
fn test_zero_commands_are_rejected() {
    let (ctx, _fake) = make_context();
    let _ = ctx.submit(&TransferSubmitInfo { cmds: &[], wait: None }, None);
}

#[test]
fn test_concurrent_submission_through_separate_contexts() {
    let (winsys, fake) = make_winsys();

    std::thread::scope(|s| {
        for _ in 0..4 {
            let winsys = &winsys;
            s.spawn(move || {
                let ctx = TransferContext::create(winsys, &TransferContextCreateInfo::default())
                    .expect("context creation");
                let cmds = single_cmd(TransferCmdFlags::empty());
                for _ in 0..8 {
                    ctx.submit(&TransferSubmitInfo { cmds: &cmds, wait: None }, None)
                        .expect("submission");
                }
                ctx.destroy().expect("context destruction");
            });
        }
    });

    assert_eq!(fake.count_of("SUBMIT_JOBS"), 32);
    assert_eq!(fake.count_of("DESTROY_CONTEXT"), 4);
    assert_eq!(winsys.live_contexts(), 0);
}
