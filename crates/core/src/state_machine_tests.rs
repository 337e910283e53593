use super::*;
use parking_lot::Mutex as StdMutex;
use std::sync::Arc;
use std::time::Duration;

fn hook_recording(log: Arc<StdMutex<Vec<State>>>) -> EntryHook {
    Box::new(move |state| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().push(state);
        })
    })
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn advances_through_the_full_transition_table() {
    let log = Arc::new(StdMutex::new(Vec::new()));
    let mut hooks: HashMap<State, EntryHook> = HashMap::new();
    for state in [
        State::ReceivingManifest,
        State::ReceivingAlgorithm,
        State::ReceivingData,
        State::Running,
        State::ResultsReady,
        State::Complete,
    ] {
        hooks.insert(state, hook_recording(Arc::clone(&log)));
    }

    let machine = StateMachine::spawn(hooks, CancellationToken::new());
    assert_eq!(machine.current(), State::Idle);

    for event in [
        StateEvent::Start,
        StateEvent::ManifestReceived,
        StateEvent::AlgorithmReceived,
        StateEvent::DataReceived,
        StateEvent::RunComplete,
        StateEvent::ResultsConsumed,
    ] {
        machine.send(event);
    }
    settle().await;

    assert_eq!(machine.current(), State::Complete);
    assert_eq!(
        *log.lock(),
        vec![
            State::ReceivingManifest,
            State::ReceivingAlgorithm,
            State::ReceivingData,
            State::Running,
            State::ResultsReady,
            State::Complete,
        ]
    );
}

#[tokio::test]
async fn unlisted_event_in_a_state_is_a_no_op() {
    let machine = StateMachine::spawn(HashMap::new(), CancellationToken::new());
    machine.send(StateEvent::DataReceived);
    settle().await;
    assert_eq!(machine.current(), State::Idle);
}

#[tokio::test]
async fn hook_does_not_refire_on_a_no_op_transition() {
    let log = Arc::new(StdMutex::new(Vec::new()));
    let mut hooks: HashMap<State, EntryHook> = HashMap::new();
    hooks.insert(State::ReceivingManifest, hook_recording(Arc::clone(&log)));

    let machine = StateMachine::spawn(hooks, CancellationToken::new());
    machine.send(StateEvent::Start);
    machine.send(StateEvent::Start);
    settle().await;

    assert_eq!(machine.current(), State::ReceivingManifest);
    assert_eq!(log.lock().len(), 1);
}

#[tokio::test]
async fn cancellation_stops_the_driver() {
    let cancel = CancellationToken::new();
    let machine = StateMachine::spawn(HashMap::new(), cancel.clone());
    cancel.cancel();
    settle().await;

    machine.send(StateEvent::Start);
    settle().await;
    assert_eq!(machine.current(), State::Idle);
}
