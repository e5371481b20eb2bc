//! Host-side bookkeeping for connection effects.
//!
//! [`ConnectionManager`](crate::connection::ConnectionManager) decides; this
//! module keeps what the host must remember between decisions: the transport
//! handle of the current attempt and the registered listeners. Effects that
//! only touch that state (`Close`, `StateChanged`) are finished here. The rest
//! come back as a [`HostAction`] for the browser layer to perform.
//!
//! Nothing here touches the browser, so the whole mapping runs in native
//! tests. All methods take `&self`; listeners are called on a snapshot with no
//! borrow held, so they may register listeners or feed new effects back in.

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::connection::{AttemptId, Effect, LoadingKind};
use crate::consts::{EVENT_PAGE_LOADING_START, EVENT_PAGE_LOADING_STOP};
use crate::transport::{TransportKind, TransportState};

/// Called with `(previous, next)` on every transition.
pub type StateListener = Rc<dyn Fn(TransportState, TransportState)>;
pub type MessageListener = Rc<dyn Fn(&str)>;

/// A `window` event announcing a loading transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadingSignal {
    pub event: &'static str,
    /// Carried as `detail.kind`; only start events have one.
    pub kind: Option<LoadingKind>,
}

/// Which manager input a timer feeds when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    Fallback(AttemptId),
    Retry,
}

/// Work left for the browser layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostAction {
    Open {
        attempt: AttemptId,
        kind: TransportKind,
        url: String,
    },
    Arm { after_ms: u32, timer: Timer },
    Dispatch(LoadingSignal),
}

/// Attempt-scoped transport handle plus listener registries.
///
/// `T` is whatever the browser layer needs to reach the live transport; for
/// `LiveSocket` it is the outbound channel.
pub struct Executor<T> {
    active: RefCell<Option<(AttemptId, T)>>,
    state_listeners: RefCell<Vec<StateListener>>,
    message_listeners: RefCell<Vec<MessageListener>>,
}

impl<T> Default for Executor<T> {
    fn default() -> Self {
        Self {
            active: RefCell::new(None),
            state_listeners: RefCell::new(Vec::new()),
            message_listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Executor<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_state_change(&self, listener: impl Fn(TransportState, TransportState) + 'static) {
        self.state_listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn on_message(&self, listener: impl Fn(&str) + 'static) {
        self.message_listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Make `handle` the transport of `attempt`, replacing any previous one.
    pub fn activate(&self, attempt: AttemptId, handle: T) {
        *self.active.borrow_mut() = Some((attempt, handle));
    }

    #[must_use]
    pub fn is_current(&self, attempt: AttemptId) -> bool {
        self.active.borrow().as_ref().is_some_and(|(a, _)| *a == attempt)
    }

    /// Drop the handle if it still belongs to `attempt`. A newer attempt's
    /// handle is left alone.
    pub fn release(&self, attempt: AttemptId) -> Option<T> {
        let mut active = self.active.borrow_mut();
        if active.as_ref().is_some_and(|(a, _)| *a == attempt) {
            active.take().map(|(_, handle)| handle)
        } else {
            None
        }
    }

    /// Run `f` against the current handle, if any.
    pub fn with_active<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.active.borrow().as_ref().map(|(_, handle)| f(handle))
    }

    pub fn notify_message(&self, text: &str) {
        let listeners = self.message_listeners.borrow().clone();
        for listener in listeners {
            listener(text);
        }
    }

    fn notify_state(&self, from: TransportState, to: TransportState) {
        let listeners = self.state_listeners.borrow().clone();
        for listener in listeners {
            listener(from, to);
        }
    }

    /// Apply one effect. Returns what is left for the browser to do.
    pub fn execute(&self, effect: Effect) -> Option<HostAction> {
        match effect {
            Effect::Open { attempt, kind, url } => Some(HostAction::Open { attempt, kind, url }),
            Effect::Close { attempt } => {
                if self.release(attempt).is_some() {
                    log::debug!("released transport of attempt {attempt}");
                }
                None
            }
            Effect::ArmFallback { attempt, after_ms } => Some(HostAction::Arm {
                after_ms,
                timer: Timer::Fallback(attempt),
            }),
            Effect::ScheduleRetry { after_ms } => {
                log::debug!("reconnecting in {after_ms}ms");
                Some(HostAction::Arm {
                    after_ms,
                    timer: Timer::Retry,
                })
            }
            Effect::StateChanged { from, to } => {
                log::debug!("connection {} -> {}", from.as_str(), to.as_str());
                self.notify_state(from, to);
                None
            }
            Effect::LoadingStart(kind) => Some(HostAction::Dispatch(LoadingSignal {
                event: EVENT_PAGE_LOADING_START,
                kind: Some(kind),
            })),
            Effect::LoadingStop => Some(HostAction::Dispatch(LoadingSignal {
                event: EVENT_PAGE_LOADING_STOP,
                kind: None,
            })),
        }
    }
}
