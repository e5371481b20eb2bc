use std::cell::RefCell;

use super::*;
use crate::config::SocketConfig;
use crate::connection::{ConnectionManager, CsrfToken};
use crate::dom::MemoryDocument;
use crate::storage::MemoryStore;
use crate::transport::PageOrigin;

fn manager() -> ConnectionManager {
    let doc = MemoryDocument::new();
    let meta = doc.append(doc.html(), "meta");
    doc.set_attribute(meta, "name", "csrf-token");
    doc.set_attribute(meta, "content", "tok");
    let Ok(token) = CsrfToken::discover(&doc) else {
        panic!("token element is present");
    };
    ConnectionManager::with_token(token, Rc::new(MemoryStore::new()))
}

fn origin() -> PageOrigin {
    PageOrigin::from_protocol("http:", "localhost:4000")
}

/// Execute every effect, returning what was left for the host.
fn drain<T>(exec: &Executor<T>, effects: Vec<Effect>) -> Vec<HostAction> {
    effects.into_iter().filter_map(|e| exec.execute(e)).collect()
}

// =============================================================
// State listeners
// =============================================================

#[test]
fn state_listeners_see_previous_and_next_in_order() {
    let exec: Executor<()> = Executor::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    exec.on_state_change(move |from, to| sink.borrow_mut().push((from, to)));

    let mut m = manager();
    drain(&exec, m.connect(SocketConfig::default(), origin()));
    drain(&exec, m.transport_opened(1));
    drain(&exec, m.transport_closed(1, "lost"));
    drain(&exec, m.retry_elapsed());

    use TransportState::{Connected, Connecting, Disconnected};
    assert_eq!(
        *seen.borrow(),
        vec![
            (Disconnected, Connecting),
            (Connecting, Connected),
            (Connected, Disconnected),
            (Disconnected, Connecting),
        ]
    );
}

#[test]
fn every_state_listener_is_called() {
    let exec: Executor<()> = Executor::new();
    let count = Rc::new(RefCell::new(0));
    for _ in 0..3 {
        let count = Rc::clone(&count);
        exec.on_state_change(move |_, _| *count.borrow_mut() += 1);
    }
    exec.execute(Effect::StateChanged {
        from: TransportState::Disconnected,
        to: TransportState::Connecting,
    });
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn listener_may_register_another_listener_while_notified() {
    let exec: Rc<Executor<()>> = Rc::new(Executor::new());
    let inner = Rc::clone(&exec);
    exec.on_state_change(move |_, _| inner.on_state_change(|_, _| {}));
    let leftover = exec.execute(Effect::StateChanged {
        from: TransportState::Disconnected,
        to: TransportState::Connecting,
    });
    assert_eq!(leftover, None);
}

#[test]
fn message_listeners_receive_text() {
    let exec: Executor<()> = Executor::new();
    let got = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&got);
    exec.on_message(move |text| sink.borrow_mut().push(text.to_owned()));
    exec.notify_message("[\"1\",null,\"phoenix\",\"heartbeat\",{}]");
    assert_eq!(got.borrow().len(), 1);
}

// =============================================================
// Attempt-scoped handle
// =============================================================

#[test]
fn close_releases_current_attempt() {
    let exec = Executor::new();
    exec.activate(1, "socket-1");
    assert!(exec.is_current(1));
    assert_eq!(exec.execute(Effect::Close { attempt: 1 }), None);
    assert!(!exec.is_current(1));
    assert_eq!(exec.with_active(|h| *h), None);
}

#[test]
fn stale_close_leaves_newer_attempt_alone() {
    let exec = Executor::new();
    exec.activate(1, "websocket");
    exec.activate(2, "longpoll");
    exec.execute(Effect::Close { attempt: 1 });
    assert!(exec.is_current(2));
    assert_eq!(exec.with_active(|h| *h), Some("longpoll"));
    assert_eq!(exec.release(1), None);
    assert_eq!(exec.release(2), Some("longpoll"));
}

#[test]
fn fallback_closes_websocket_and_opens_long_poll() {
    let exec = Executor::new();
    let mut m = manager();
    for action in drain(&exec, m.connect(SocketConfig::default(), origin())) {
        if let HostAction::Open { attempt, .. } = action {
            exec.activate(attempt, attempt);
        }
    }
    let actions = drain(&exec, m.fallback_elapsed(1));
    assert!(!exec.is_current(1));
    assert!(matches!(
        actions.as_slice(),
        [HostAction::Open {
            attempt: 2,
            kind: TransportKind::LongPoll,
            ..
        }]
    ));
}

// =============================================================
// Host actions
// =============================================================

#[test]
fn timers_name_the_input_they_feed() {
    let exec: Executor<()> = Executor::new();
    assert_eq!(
        exec.execute(Effect::ArmFallback {
            attempt: 4,
            after_ms: 2500
        }),
        Some(HostAction::Arm {
            after_ms: 2500,
            timer: Timer::Fallback(4)
        })
    );
    assert_eq!(
        exec.execute(Effect::ScheduleRetry { after_ms: 50 }),
        Some(HostAction::Arm {
            after_ms: 50,
            timer: Timer::Retry
        })
    );
}

#[test]
fn loading_effects_become_window_events() {
    let exec: Executor<()> = Executor::new();
    assert_eq!(
        exec.execute(Effect::LoadingStart(LoadingKind::Reconnect)),
        Some(HostAction::Dispatch(LoadingSignal {
            event: "phx:page-loading-start",
            kind: Some(LoadingKind::Reconnect),
        }))
    );
    assert_eq!(
        exec.execute(Effect::LoadingStop),
        Some(HostAction::Dispatch(LoadingSignal {
            event: "phx:page-loading-stop",
            kind: None,
        }))
    );
}

#[test]
fn initial_connect_leaves_open_start_and_fallback_for_host() {
    let exec: Executor<()> = Executor::new();
    let mut m = manager();
    let actions = drain(&exec, m.connect(SocketConfig::default(), origin()));
    assert_eq!(actions.len(), 3);
    assert!(matches!(
        actions[0],
        HostAction::Dispatch(LoadingSignal {
            kind: Some(LoadingKind::Initial),
            ..
        })
    ));
    assert!(matches!(actions[1], HostAction::Open { attempt: 1, .. }));
    assert!(matches!(
        actions[2],
        HostAction::Arm {
            timer: Timer::Fallback(1),
            ..
        }
    ));
}
