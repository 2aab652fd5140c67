//! Tests for the host-facing embedding surface.

mod common;

use std::rc::Rc;

use common::{Cluster, MockBackend, MockDriver};
use framelock_client::{
    BackendBinding, EventData, RenderEvent, SwapGroupClient, SyncContext, WarmupAction,
};

type TestContext = SyncContext<MockDriver, MockBackend>;

fn unbound_context(cluster: &Rc<Cluster>) -> TestContext {
    SyncContext::new(SwapGroupClient::new(MockDriver::new(cluster, 1, 1)))
}

fn bound_context(cluster: &Rc<Cluster>) -> TestContext {
    let mut context = unbound_context(cluster);
    context.bind_graphics(BackendBinding::Bound(MockBackend::new(cluster)));
    context
}

#[test]
fn binding_failures_publish_their_reason() {
    for (binding, expected_code) in [
        (BackendBinding::InterfacesMissing, 2),
        (BackendBinding::UnsupportedApi, 3),
        (BackendBinding::DeviceMissing, 4),
        (BackendBinding::SwapChainMissing, 5),
    ] {
        let cluster = Cluster::new();
        let mut context = unbound_context(&cluster);
        context.bind_graphics(binding);

        assert_eq!(context.state().initialization_state, expected_code);
        assert!(!context.wants_present_override());
        assert!(!context.present_frame());
    }
}

#[test]
fn unbound_context_drops_commands_and_flags_initialize() {
    let cluster = Cluster::new();
    let mut context = unbound_context(&cluster);
    assert_eq!(context.state().initialization_state, 0);

    context.dispatch(RenderEvent::EnableSystem, EventData::Toggle(true));
    assert!(cluster.take_log().is_empty());

    context.dispatch(RenderEvent::Initialize, EventData::None);
    assert_eq!(context.state().initialization_state, 2);
    assert!(cluster.take_log().is_empty());
}

#[test]
fn initialize_event_runs_workstation_setup_then_the_boot_protocol() {
    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);

    context.dispatch(RenderEvent::Initialize, EventData::None);

    assert_eq!(context.state().initialization_state, 1);
    let log = cluster.take_log();
    let workstation = log
        .iter()
        .position(|e| e == "workstation(0, true)")
        .expect("workstation feature enabled");
    let boot = log
        .iter()
        .position(|e| e == "query_max_swap_group")
        .expect("boot protocol ran");
    assert!(workstation < boot, "workstation setup precedes the boot");
}

#[test]
fn frame_count_event_writes_into_the_out_slot() {
    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);
    context.dispatch(RenderEvent::Initialize, EventData::None);

    // Switch to the local counter so the sequence is deterministic.
    context.dispatch(RenderEvent::EnableSyncCounter, EventData::Toggle(false));

    let mut out = -1;
    context.dispatch(RenderEvent::QueryFrameCount, EventData::FrameCountOut(&mut out));
    assert_eq!(out, 1);
    let mut out2 = -1;
    context.dispatch(RenderEvent::QueryFrameCount, EventData::FrameCountOut(&mut out2));
    assert_eq!(out2, 2);

    // A query without an out-slot is dropped, not a crash.
    context.dispatch(RenderEvent::QueryFrameCount, EventData::None);
}

#[test]
fn present_frame_runs_the_synchronized_path() {
    fn engaged_immediately() -> WarmupAction {
        WarmupAction::BarrierWarmedUp
    }

    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);
    context.dispatch(RenderEvent::Initialize, EventData::None);
    context.set_warmup_oracle(Some(engaged_immediately));
    cluster.take_log();

    assert!(context.wants_present_override());
    assert!(context.present_frame());

    assert_eq!(
        cluster.take_log(),
        vec!["initiate_repeats", "present", "conclude_repeats"]
    );
    assert_eq!(context.state().presented_frames_success, 1);
}

#[test]
fn skip_request_bypasses_one_present() {
    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);
    context.dispatch(RenderEvent::Initialize, EventData::None);
    context.set_warmup_oracle(Some(|| WarmupAction::BarrierWarmedUp));
    cluster.take_log();

    context.skip_synchronized_present_of_next_frame();
    assert!(!context.present_frame());
    assert!(cluster.take_log().is_empty());
    assert!(context.present_frame());
}

#[test]
fn dispose_event_unwinds_membership_and_the_workstation_feature() {
    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);
    context.dispatch(RenderEvent::Initialize, EventData::None);
    cluster.take_log();

    context.dispatch(RenderEvent::Dispose, EventData::None);

    let log = cluster.take_log();
    let unbind = log.iter().position(|e| e == "bind(1, 0)").expect("unbind");
    let leave = log
        .iter()
        .position(|e| e == "join(0, false)")
        .expect("leave");
    let workstation = log
        .iter()
        .position(|e| e == "workstation(0, false)")
        .expect("workstation feature disabled");
    assert!(unbind < leave && leave < workstation);

    let state = context.state();
    assert_eq!(state.swap_group_id, 0);
    assert_eq!(state.swap_barrier_id, 0);
}

#[test]
fn system_toggles_flow_through_dispatch() {
    let cluster = Cluster::new();
    let mut context = bound_context(&cluster);
    context.dispatch(RenderEvent::Initialize, EventData::None);
    context.dispatch(RenderEvent::Dispose, EventData::None);
    cluster.take_log();

    context.dispatch(RenderEvent::EnableSystem, EventData::Toggle(true));
    let state = context.state();
    assert_eq!((state.swap_group_id, state.swap_barrier_id), (1, 1));

    context.dispatch(RenderEvent::EnableSystem, EventData::Toggle(false));
    let state = context.state();
    assert_eq!((state.swap_group_id, state.swap_barrier_id), (0, 0));

    // Group and barrier toggles are also reachable individually.
    context.dispatch(RenderEvent::EnableSwapGroup, EventData::Toggle(true));
    assert_eq!(context.state().swap_group_id, 1);
    context.dispatch(RenderEvent::EnableSwapBarrier, EventData::Toggle(true));
    assert_eq!(context.state().swap_barrier_id, 1);
}
