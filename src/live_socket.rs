//! Browser host for [`ConnectionManager`].
//!
//! `LiveSocket` feeds transport and timer events into the manager and hands
//! the [`Effect`]s it returns to an [`Executor`]. What the executor leaves
//! over is browser work: websocket and long-poll drivers run as `spawn_local`
//! tasks, timers are `gloo_timers` sleeps, and loading transitions are
//! dispatched on `window` as `phx:page-loading-start` / `phx:page-loading-stop`.
//!
//! The manager is only borrowed for the duration of one call. Effects run
//! after the borrow is released, so listeners may call back into the socket.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::channel::mpsc::{self, TryRecvError, UnboundedReceiver, UnboundedSender};
use futures::{SinkExt, StreamExt};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsValue;

use crate::config::SocketConfig;
use crate::connection::{AttemptId, ConnectionManager, Effect};
use crate::consts::LONG_POLL_IDLE_MS;
use crate::debug::{DebugSettings, DebugTarget, Delivery};
use crate::error::BootError;
use crate::executor::{Executor, HostAction, LoadingSignal, Timer};
use crate::transport::{PageOrigin, TransportKind, TransportState};

/// How often a websocket handshake is polled for completion.
const HANDSHAKE_POLL_MS: u32 = 10;

/// The page's live connection.
pub struct LiveSocket {
    this: Weak<LiveSocket>,
    manager: RefCell<ConnectionManager>,
    settings: DebugSettings,
    executor: Executor<UnboundedSender<String>>,
}

impl LiveSocket {
    #[must_use]
    pub fn new(manager: ConnectionManager, settings: DebugSettings) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            manager: RefCell::new(manager),
            settings,
            executor: Executor::new(),
        })
    }

    /// Begin connecting. Returns immediately; the handshake completes later.
    pub fn connect(&self, config: SocketConfig, origin: PageOrigin) {
        let effects = self.manager.borrow_mut().connect(config, origin);
        self.run(effects);
    }

    /// Register a listener called with `(previous, next)` on every transition.
    pub fn on_state_change(&self, listener: impl Fn(TransportState, TransportState) + 'static) {
        self.executor.on_state_change(listener);
    }

    /// Register a handler for inbound text frames.
    pub fn on_message(&self, listener: impl Fn(&str) + 'static) {
        self.executor.on_message(listener);
    }

    /// Queue `payload` on the active transport, after any simulated latency.
    pub fn push(&self, payload: String) {
        self.with_latency(move |socket| socket.send_now(payload));
    }

    fn send_now(&self, payload: String) {
        let sent = self.executor.with_active(|tx| tx.unbounded_send(payload));
        match sent {
            Some(Ok(())) => {}
            Some(Err(e)) => log::debug!("dropping outbound message: {e}"),
            None => log::debug!("dropping outbound message: no active transport"),
        }
    }

    fn deliver(&self, text: String) {
        self.with_latency(move |socket| socket.executor.notify_message(&text));
    }

    /// Run `f` now, or after the simulated latency when one is set.
    fn with_latency(&self, f: impl FnOnce(&LiveSocket) + 'static) {
        match self.settings.delivery() {
            Delivery::Immediate => f(self),
            Delivery::Delayed(ms) => self.after(ms, f),
        }
    }

    fn report_opened(&self, attempt: AttemptId) {
        let effects = self.manager.borrow_mut().transport_opened(attempt);
        self.run(effects);
    }

    fn report_closed(&self, attempt: AttemptId, reason: &str) {
        drop(self.executor.release(attempt));
        let effects = self.manager.borrow_mut().transport_closed(attempt, reason);
        self.run(effects);
    }

    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            let Some(action) = self.executor.execute(effect) else {
                continue;
            };
            match action {
                HostAction::Open { attempt, kind, url } => self.open(attempt, kind, url),
                HostAction::Arm {
                    after_ms,
                    timer: Timer::Fallback(attempt),
                } => self.after(after_ms, move |socket| {
                    let effects = socket.manager.borrow_mut().fallback_elapsed(attempt);
                    socket.run(effects);
                }),
                HostAction::Arm {
                    after_ms,
                    timer: Timer::Retry,
                } => self.after(after_ms, |socket| {
                    let effects = socket.manager.borrow_mut().retry_elapsed();
                    socket.run(effects);
                }),
                HostAction::Dispatch(signal) => {
                    if let Err(e) = dispatch_loading(signal) {
                        log::warn!("{} not dispatched: {e}", signal.event);
                    }
                }
            }
        }
    }

    fn after(&self, ms: u32, then: impl FnOnce(&LiveSocket) + 'static) {
        let this = self.this.clone();
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(ms).await;
            if let Some(socket) = this.upgrade() {
                then(&socket);
            }
        });
    }

    fn open(&self, attempt: AttemptId, kind: TransportKind, url: String) {
        let (tx, rx) = mpsc::unbounded();
        self.executor.activate(attempt, tx);
        let this = self.this.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match kind {
                TransportKind::WebSocket => run_websocket(&this, attempt, &url, rx).await,
                TransportKind::LongPoll => run_long_poll(&this, attempt, &url, rx).await,
            };
            let reason = match outcome {
                Ok(()) => "closed".to_owned(),
                Err(e) => e.to_string(),
            };
            if let Some(socket) = this.upgrade() {
                socket.report_closed(attempt, &reason);
            }
        });
    }

    fn is_current(&self, attempt: AttemptId) -> bool {
        self.executor.is_current(attempt)
    }
}

impl DebugTarget for LiveSocket {
    fn transport_state(&self) -> TransportState {
        self.manager.borrow().state()
    }

    fn transport_kind(&self) -> TransportKind {
        self.manager.borrow().kind()
    }

    fn settings(&self) -> &DebugSettings {
        &self.settings
    }

    fn connect(&self) {
        let effects = self.manager.borrow_mut().reconnect();
        self.run(effects);
    }

    fn disconnect(&self) {
        log::info!("disconnected by developer");
        let effects = self.manager.borrow_mut().disconnect();
        self.run(effects);
    }
}

fn dispatch_loading(signal: LoadingSignal) -> Result<(), BootError> {
    let window = web_sys::window().ok_or(BootError::NoWindow)?;
    let init = web_sys::CustomEventInit::new();
    if let Some(kind) = signal.kind {
        let detail = js_sys::Object::new();
        js_sys::Reflect::set(&detail, &JsValue::from_str("kind"), &JsValue::from_str(kind.as_str()))
            .map_err(|e| BootError::Dom(format!("{e:?}")))?;
        init.set_detail(&detail);
    }
    let event = web_sys::CustomEvent::new_with_event_init_dict(signal.event, &init)
        .map_err(|e| BootError::Dom(format!("{e:?}")))?;
    window
        .dispatch_event(&event)
        .map_err(|e| BootError::Dom(format!("{e:?}")))?;
    Ok(())
}

async fn run_websocket(
    socket: &Weak<LiveSocket>,
    attempt: AttemptId,
    url: &str,
    mut rx: UnboundedReceiver<String>,
) -> Result<(), BootError> {
    use gloo_net::websocket::futures::WebSocket;
    use gloo_net::websocket::{Message, State};

    let ws = WebSocket::open(url).map_err(|e| BootError::Transport(e.to_string()))?;

    // The handshake has no completion future; watch readyState instead.
    loop {
        match ws.state() {
            State::Open => break,
            State::Connecting => TimeoutFuture::new(HANDSHAKE_POLL_MS).await,
            State::Closing | State::Closed => {
                return Err(BootError::Transport("websocket closed during handshake".to_owned()));
            }
        }
        if !socket.upgrade().is_some_and(|s| s.is_current(attempt)) {
            return Ok(());
        }
    }
    match socket.upgrade() {
        Some(s) => s.report_opened(attempt),
        None => return Ok(()),
    }

    let (mut ws_write, mut ws_read) = ws.split();

    let send_task = async {
        while let Some(msg) = rx.next().await {
            if ws_write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Some(s) = socket.upgrade() {
                        s.deliver(text);
                    }
                }
                Ok(Message::Bytes(bytes)) => {
                    log::debug!("ignoring {} byte binary frame", bytes.len());
                }
                Err(e) => {
                    log::warn!("websocket receive error: {e}");
                    break;
                }
            }
        }
    };

    // Either side ending (sender dropped on close, or server hang-up) ends the attempt.
    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
    Ok(())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

async fn run_long_poll(
    socket: &Weak<LiveSocket>,
    attempt: AttemptId,
    url: &str,
    mut rx: UnboundedReceiver<String>,
) -> Result<(), BootError> {
    use gloo_net::http::Request;

    let mut opened = false;
    loop {
        // Flush queued outbound messages; a closed channel ends the attempt.
        loop {
            match rx.try_recv() {
                Ok(body) => {
                    let response = Request::post(url)
                        .body(body)
                        .map_err(|e| BootError::Transport(e.to_string()))?
                        .send()
                        .await
                        .map_err(|e| BootError::Transport(e.to_string()))?;
                    if !is_success(response.status()) {
                        return Err(BootError::Transport(format!("long-poll send status {}", response.status())));
                    }
                }
                Err(TryRecvError::Closed) => return Ok(()),
                Err(TryRecvError::Empty) => break,
            }
        }

        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| BootError::Transport(e.to_string()))?;
        if !is_success(response.status()) {
            return Err(BootError::Transport(format!("long-poll status {}", response.status())));
        }
        let Some(live) = socket.upgrade() else {
            return Ok(());
        };
        if !live.is_current(attempt) {
            return Ok(());
        }
        if !opened {
            opened = true;
            live.report_opened(attempt);
        }
        let body = response.text().await.map_err(|e| BootError::Transport(e.to_string()))?;
        if !body.is_empty() {
            live.deliver(body);
        }
        drop(live);
        TimeoutFuture::new(LONG_POLL_IDLE_MS).await;
    }
}
