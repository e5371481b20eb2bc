//! Connection lifecycle manager.
//!
//! `ConnectionManager` owns the page's single live connection as a pure state
//! machine. Every input (connect request, transport opened/closed, timer
//! fired, developer disconnect) returns the [`Effect`]s the host must carry
//! out: open or close a transport, arm a timer, notify state listeners, or
//! signal page-loading start/stop. The hydrate-only `LiveSocket` in
//! `live_socket.rs` executes effects against the browser; tests execute them
//! by inspection.
//!
//! STATE MACHINE
//! =============
//! `Disconnected -> Connecting -> Connected`, `Connected -> Disconnected` on
//! loss, then back to `Connecting` after a backoff delay. There is no
//! terminal state; only a developer `disconnect` stops the retry loop.
//!
//! FALLBACK
//! ========
//! The first attempt uses a websocket. If it has not connected within
//! `fallback_timeout_ms`, or fails before ever connecting, the manager
//! switches to long-poll and records that choice in session storage so later
//! page loads in the same session start on long-poll. A websocket that has
//! connected once is never demoted.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use std::rc::Rc;

use crate::config::SocketConfig;
use crate::consts::{CSRF_META_ATTR, CSRF_META_NAME, LONG_POLL_FALLBACK_SESSION_KEY};
use crate::dom::{Document, Selector};
use crate::error::BootError;
use crate::storage::{KeyValueStore, read_best_effort, write_best_effort};
use crate::transport::{Backoff, PageOrigin, TransportKind, TransportState, handshake_url};

/// The page's CSRF token. Read once; never changes for the page's lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Read the token from `meta[name='csrf-token']`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::MissingToken`] when the element or its `content`
    /// attribute is absent or empty.
    pub fn discover<D: Document>(doc: &D) -> Result<Self, BootError> {
        let meta = doc
            .query(&Selector::MetaName(CSRF_META_NAME))
            .ok_or(BootError::MissingToken)?;
        let value = doc.attribute(&meta, CSRF_META_ATTR).ok_or(BootError::MissingToken)?;
        if value.is_empty() {
            return Err(BootError::MissingToken);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

/// Identifies one transport attempt; events for older attempts are ignored.
pub type AttemptId = u64;

/// Why a loading cycle started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadingKind {
    /// First connection of the page.
    Initial,
    /// Re-establishing a lost connection.
    Reconnect,
}

impl LoadingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Reconnect => "reconnect",
        }
    }
}

/// Work the host performs on the manager's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Open a transport and report back with `attempt`.
    Open {
        attempt: AttemptId,
        kind: TransportKind,
        url: String,
    },
    /// Tear down the transport opened for `attempt`.
    Close { attempt: AttemptId },
    /// Call [`ConnectionManager::fallback_elapsed`] after `after_ms`.
    ArmFallback { attempt: AttemptId, after_ms: u32 },
    /// Call [`ConnectionManager::retry_elapsed`] after `after_ms`.
    ScheduleRetry { after_ms: u32 },
    /// Notify state listeners.
    StateChanged { from: TransportState, to: TransportState },
    /// Dispatch a page-loading start.
    LoadingStart(LoadingKind),
    /// Dispatch a page-loading stop.
    LoadingStop,
}

/// Supervisor for the single live connection.
pub struct ConnectionManager {
    token: CsrfToken,
    session: Rc<dyn KeyValueStore>,
    config: Option<SocketConfig>,
    origin: Option<PageOrigin>,
    state: TransportState,
    kind: TransportKind,
    attempt: AttemptId,
    backoff: Backoff,
    primary_established: bool,
    connected_once: bool,
    loading: bool,
    halted: bool,
}

impl ConnectionManager {
    /// Discover the token and prepare a manager.
    ///
    /// Returns `None` (after logging) when the page carries no token; no
    /// connection is attempted and discovery is not retried.
    pub fn initialize<D: Document>(doc: &D, session: Rc<dyn KeyValueStore>) -> Option<Self> {
        match CsrfToken::discover(doc) {
            Ok(token) => Some(Self::with_token(token, session)),
            Err(e) => {
                log::warn!("live connection disabled: {e}");
                None
            }
        }
    }

    /// Build a manager from an already-known token.
    #[must_use]
    pub fn with_token(token: CsrfToken, session: Rc<dyn KeyValueStore>) -> Self {
        let fell_back = read_best_effort(&*session, LONG_POLL_FALLBACK_SESSION_KEY).as_deref() == Some("true");
        let kind = if fell_back {
            log::debug!("session previously fell back; starting on long-poll");
            TransportKind::LongPoll
        } else {
            TransportKind::WebSocket
        };
        Self {
            token,
            session,
            config: None,
            origin: None,
            state: TransportState::Disconnected,
            kind,
            attempt: 0,
            backoff: Backoff::default(),
            primary_established: false,
            connected_once: false,
            loading: false,
            halted: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> TransportState {
        self.state
    }

    #[must_use]
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    #[must_use]
    pub fn token(&self) -> &CsrfToken {
        &self.token
    }

    /// The attempt whose transport events are currently accepted.
    #[must_use]
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Effective configuration, with the token filled in, once connected.
    #[must_use]
    pub fn config(&self) -> Option<&SocketConfig> {
        self.config.as_ref()
    }

    /// Start connecting. Non-blocking: the handshake completes later through
    /// [`Self::transport_opened`].
    ///
    /// Intended to be called once per page load. A call while a connection
    /// is already live or in progress is ignored.
    pub fn connect(&mut self, mut config: SocketConfig, origin: PageOrigin) -> Vec<Effect> {
        if self.state != TransportState::Disconnected {
            log::debug!("connect ignored: already {}", self.state.as_str());
            return Vec::new();
        }
        config.params.csrf_token = self.token.as_str().to_owned();
        self.config = Some(config);
        self.origin = Some(origin);
        self.halted = false;
        let mut effects = Vec::new();
        self.begin_attempt(&mut effects);
        effects
    }

    /// The transport for `attempt` completed its handshake.
    pub fn transport_opened(&mut self, attempt: AttemptId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if attempt != self.attempt || self.halted || self.state != TransportState::Connecting {
            return effects;
        }
        log::info!("connected via {}", self.kind.as_str());
        self.backoff.reset();
        self.connected_once = true;
        if self.kind == TransportKind::WebSocket {
            self.primary_established = true;
        }
        self.transition(TransportState::Connected, &mut effects);
        effects
    }

    /// The transport for `attempt` closed or failed.
    pub fn transport_closed(&mut self, attempt: AttemptId, reason: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if attempt != self.attempt || self.halted || self.state == TransportState::Disconnected {
            return effects;
        }
        if self.may_fall_back() {
            log::warn!("websocket failed before connecting ({reason}); falling back");
            self.fall_back(&mut effects);
            return effects;
        }
        log::warn!("{} transport closed: {reason}", self.kind.as_str());
        self.transition(TransportState::Disconnected, &mut effects);
        effects.push(Effect::ScheduleRetry {
            after_ms: self.backoff.next_delay_ms(),
        });
        effects
    }

    /// The fallback timer armed for `attempt` fired.
    pub fn fallback_elapsed(&mut self, attempt: AttemptId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if attempt != self.attempt || self.halted || !self.may_fall_back() {
            return effects;
        }
        log::warn!("websocket did not connect in time; falling back to long-poll");
        effects.push(Effect::Close { attempt });
        self.fall_back(&mut effects);
        effects
    }

    /// A scheduled reconnect is due.
    pub fn retry_elapsed(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.halted || self.state != TransportState::Disconnected || self.config.is_none() {
            return effects;
        }
        self.begin_attempt(&mut effects);
        effects
    }

    /// Developer disconnect: close the transport and stop reconnecting.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.halted = true;
        if self.state != TransportState::Disconnected {
            effects.push(Effect::Close { attempt: self.attempt });
            self.transition(TransportState::Disconnected, &mut effects);
        }
        effects
    }

    /// Developer reconnect after [`Self::disconnect`].
    pub fn reconnect(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state != TransportState::Disconnected {
            return effects;
        }
        if self.config.is_none() {
            log::warn!("reconnect ignored: connect was never called");
            return effects;
        }
        self.halted = false;
        self.backoff.reset();
        self.begin_attempt(&mut effects);
        effects
    }

    fn may_fall_back(&self) -> bool {
        self.state == TransportState::Connecting
            && self.kind == TransportKind::WebSocket
            && !self.primary_established
            && self.config.as_ref().is_some_and(|c| c.fallback_timeout_ms > 0)
    }

    fn fall_back(&mut self, effects: &mut Vec<Effect>) {
        self.kind = TransportKind::LongPoll;
        write_best_effort(&*self.session, LONG_POLL_FALLBACK_SESSION_KEY, "true");
        self.begin_attempt(effects);
    }

    fn begin_attempt(&mut self, effects: &mut Vec<Effect>) {
        let (Some(config), Some(origin)) = (self.config.as_ref(), self.origin.as_ref()) else {
            return;
        };
        self.attempt += 1;
        let url = handshake_url(origin, config, self.kind);
        let fallback_ms = config.fallback_timeout_ms;
        log::debug!("attempt {} opening {}", self.attempt, self.kind.as_str());
        self.transition(TransportState::Connecting, effects);
        effects.push(Effect::Open {
            attempt: self.attempt,
            kind: self.kind,
            url,
        });
        if self.kind == TransportKind::WebSocket && !self.primary_established && fallback_ms > 0 {
            effects.push(Effect::ArmFallback {
                attempt: self.attempt,
                after_ms: fallback_ms,
            });
        }
    }

    fn transition(&mut self, to: TransportState, effects: &mut Vec<Effect>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        effects.push(Effect::StateChanged { from, to });
        match to {
            TransportState::Connecting if !self.loading => {
                self.loading = true;
                effects.push(Effect::LoadingStart(if self.connected_once {
                    LoadingKind::Reconnect
                } else {
                    LoadingKind::Initial
                }));
            }
            TransportState::Connected if self.loading => {
                self.loading = false;
                effects.push(Effect::LoadingStop);
            }
            TransportState::Disconnected if self.halted && self.loading => {
                self.loading = false;
                effects.push(Effect::LoadingStop);
            }
            _ => {}
        }
    }
}
