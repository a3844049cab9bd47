use std::sync::Arc;

use oopviz::{
    NavOutcome, NavRequest, NavRuntime, NavRuntimeConfig, Navigator, ProgramState, SceneEngine,
    SceneScript,
};

/// Replays every transition from scene zero with no cache involved.
fn replay_from_zero(engine: &SceneEngine, target: usize) -> ProgramState {
    let mut state = ProgramState::initial();
    for index in 1..=target {
        state = engine.apply(&state, index).unwrap();
    }
    state
}

#[test]
fn goto_is_deterministic_regardless_of_navigation_history() {
    let scene_count = SceneScript::shared().len();

    for target in 0..scene_count {
        // Path 1: goto directly from a fresh controller.
        let mut direct = Navigator::new().unwrap();
        direct.goto(target).unwrap();

        // Path 2: next() one scene at a time.
        let mut stepped = Navigator::new().unwrap();
        for _ in 0..target {
            stepped.next().unwrap();
        }

        // Path 3: overshoot, then come back.
        let mut detoured = Navigator::new().unwrap();
        detoured.goto((target + 3).min(scene_count - 1)).unwrap();
        detoured.goto(target).unwrap();

        assert_eq!(direct.state(), stepped.state(), "target {target}");
        assert_eq!(direct.state(), detoured.state(), "target {target}");
        assert_eq!(
            direct.state().fingerprint(),
            stepped.state().fingerprint(),
            "target {target}"
        );
    }
}

#[test]
fn cache_is_transparent_at_every_index() {
    let engine = SceneEngine::new(Arc::new(SceneScript::load().unwrap()));
    let scene_count = engine.script().len();

    let mut nav = Navigator::new().unwrap();
    // Warm the cache with a scattered access pattern first.
    for target in [15, 4, 11, 0, 9] {
        nav.goto(target).unwrap();
    }

    for target in 0..scene_count {
        nav.goto(target).unwrap();
        let uncached = replay_from_zero(&engine, target);
        assert_eq!(nav.state(), &uncached, "cache diverged at {target}");
        assert_eq!(
            nav.state().fingerprint(),
            uncached.fingerprint(),
            "fingerprint diverged at {target}"
        );
    }
}

#[test]
fn boundary_requests_change_nothing() {
    let mut nav = Navigator::new().unwrap();

    let initial = nav.state().clone();
    assert_eq!(nav.previous().unwrap(), NavOutcome::Boundary);
    assert_eq!(nav.state(), &initial);
    assert_eq!(nav.scene_index(), 0);

    nav.goto(usize::MAX).unwrap();
    assert_eq!(nav.scene_index(), 15);
    let last = nav.state().clone();
    assert_eq!(nav.next().unwrap(), NavOutcome::Boundary);
    assert_eq!(nav.state(), &last);
    assert_eq!(nav.scene_index(), 15);
}

#[test]
fn reset_is_idempotent_after_any_history() {
    let pristine = ProgramState::initial();

    let mut nav = Navigator::new().unwrap();
    nav.goto(13).unwrap();
    nav.previous().unwrap();
    nav.next().unwrap();

    for _ in 0..3 {
        nav.reset();
        assert_eq!(nav.scene_index(), 0);
        assert_eq!(nav.state(), &pristine);
    }

    // The timeline is fully reusable after reset.
    nav.goto(9).unwrap();
    assert_eq!(nav.state().resolved_status_of(oopviz::InstanceName::D1), Some("Online"));
}

#[test]
fn frame_fingerprint_matches_the_state_digest() {
    let mut nav = Navigator::new().unwrap();
    nav.goto(11).unwrap();
    let frame = nav.frame().unwrap();
    assert_eq!(frame.fingerprint, hex::encode(nav.state().fingerprint()));
}

#[test]
fn dispatch_runtime_serializes_a_full_walkthrough() {
    let runtime = NavRuntime::new(Navigator::new().unwrap(), NavRuntimeConfig::default());

    // A learner's realistic session: forward pass, a jump back, a reset.
    let mut handles = Vec::new();
    for _ in 0..15 {
        handles.push(runtime.execute_async(NavRequest::Next).unwrap());
    }
    let expected: Vec<usize> = (1..=15).collect();
    let resolved: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap().frame.scene_index)
        .collect();
    assert_eq!(resolved, expected);

    let back = runtime.execute(NavRequest::Goto(6)).unwrap();
    assert_eq!(back.frame.scene_index, 6);
    assert_eq!(back.outcome, NavOutcome::Moved);

    let reset = runtime.execute(NavRequest::Reset).unwrap();
    assert_eq!(reset.frame.scene_index, 0);
    assert_eq!(reset.frame.state, ProgramState::initial());
}
