//! Transport vocabulary: states, kinds, reconnect backoff, handshake URLs.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use crate::config::SocketConfig;
use crate::consts::{RECONNECT_CEILING_MS, RECONNECT_STEPS_MS};

/// Connection state as seen by the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    /// No socket; either never opened, lost, or closed by the developer.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    Connected,
}

impl TransportState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

/// Which transport carries the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportKind {
    #[default]
    WebSocket,
    /// Degraded HTTP polling used when websockets are blocked.
    LongPoll,
}

impl TransportKind {
    /// Path segment appended to the endpoint.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::LongPoll => "longpoll",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::LongPoll => "longpoll",
        }
    }
}

/// Scheme and authority of the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageOrigin {
    /// Page served over `https:`.
    pub secure: bool,
    /// `host[:port]`
    pub host: String,
}

impl PageOrigin {
    /// Build from `window.location.protocol` (`"https:"`, `"http:"`) and
    /// `host`. Any protocol other than `https:` counts as insecure.
    #[must_use]
    pub fn from_protocol(protocol: &str, host: &str) -> Self {
        Self {
            secure: protocol.eq_ignore_ascii_case("https:"),
            host: host.to_owned(),
        }
    }

    #[cfg(feature = "hydrate")]
    /// The current page's origin.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BootError::NoWindow`] outside a browser.
    pub fn current() -> Result<Self, crate::error::BootError> {
        use crate::error::BootError;

        let location = web_sys::window().ok_or(BootError::NoWindow)?.location();
        let protocol = location.protocol().map_err(|e| BootError::Dom(format!("{e:?}")))?;
        let host = location.host().map_err(|e| BootError::Dom(format!("{e:?}")))?;
        Ok(Self::from_protocol(&protocol, &host))
    }
}

/// Full handshake URL for `kind`, with percent-encoded parameters.
#[must_use]
pub fn handshake_url(origin: &PageOrigin, config: &SocketConfig, kind: TransportKind) -> String {
    let scheme = match (kind, origin.secure) {
        (TransportKind::WebSocket, true) => "wss",
        (TransportKind::WebSocket, false) => "ws",
        (TransportKind::LongPoll, true) => "https",
        (TransportKind::LongPoll, false) => "http",
    };
    let endpoint = config.endpoint.trim_end_matches('/');
    let query = config
        .params
        .query_pairs()
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{scheme}://{host}{endpoint}/{segment}?{query}",
        host = origin.host,
        segment = kind.path_segment()
    )
}

/// Stepped reconnect delays: 10, 50, 100, 150, 200, 250, 500, 1000, 2000 ms,
/// then 5000 ms for every later attempt.
#[derive(Clone, Debug, Default)]
pub struct Backoff {
    tries: usize,
}

impl Backoff {
    /// Delay before the next attempt; advances the schedule.
    pub fn next_delay_ms(&mut self) -> u32 {
        let delay = RECONNECT_STEPS_MS
            .get(self.tries)
            .copied()
            .unwrap_or(RECONNECT_CEILING_MS);
        self.tries = self.tries.saturating_add(1);
        delay
    }

    /// Back to the first step after a successful connection.
    pub fn reset(&mut self) {
        self.tries = 0;
    }

    #[must_use]
    pub fn tries(&self) -> usize {
        self.tries
    }
}
