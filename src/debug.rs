//! Developer escape hatch: debug logging, latency simulation, and the
//! process-wide handle to the live connection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Settings are kept in `sessionStorage` so they survive reloads for the rest
//! of the browser session and vanish afterwards. The connection registers
//! itself in a thread-local slot at startup; in the browser the slot is also
//! reachable from the console as `window.liveSocket`:
//!
//! ```text
//! >> liveSocket.enableDebug()
//! >> liveSocket.enableLatencySim(1000)
//! >> liveSocket.disableLatencySim()
//! ```
//!
//! Nothing here is guarded. It is for manual sessions only.

#[cfg(test)]
#[path = "debug_test.rs"]
mod debug_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::{DEBUG_SESSION_KEY, LATENCY_SIM_SESSION_KEY};
use crate::storage::{KeyValueStore, read_best_effort, remove_best_effort, write_best_effort};
use crate::transport::{TransportKind, TransportState};

/// Session-scoped developer settings.
#[derive(Clone)]
pub struct DebugSettings {
    store: Rc<dyn KeyValueStore>,
}

impl DebugSettings {
    #[must_use]
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn enable_debug(&self) {
        write_best_effort(&*self.store, DEBUG_SESSION_KEY, "true");
        log::set_max_level(log::LevelFilter::Debug);
    }

    pub fn disable_debug(&self) {
        remove_best_effort(&*self.store, DEBUG_SESSION_KEY);
        log::set_max_level(log::LevelFilter::Info);
    }

    #[must_use]
    pub fn is_debug_enabled(&self) -> bool {
        read_best_effort(&*self.store, DEBUG_SESSION_KEY).as_deref() == Some("true")
    }

    /// Delay every inbound and outbound message by `ms` for this session.
    pub fn enable_latency_sim(&self, ms: u32) {
        log::info!("latency simulator enabled for the duration of this browser session: {ms}ms");
        write_best_effort(&*self.store, LATENCY_SIM_SESSION_KEY, &ms.to_string());
    }

    pub fn disable_latency_sim(&self) {
        remove_best_effort(&*self.store, LATENCY_SIM_SESSION_KEY);
    }

    /// Current simulated latency; unparsable values count as disabled.
    #[must_use]
    pub fn latency_sim(&self) -> Option<u32> {
        let raw = read_best_effort(&*self.store, LATENCY_SIM_SESSION_KEY)?;
        match raw.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(ms) => Some(ms),
            Err(_) => {
                log::debug!("ignoring latency simulation value {raw:?}");
                None
            }
        }
    }
}

/// When a message crosses the transport boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Immediate,
    /// Held back by the latency simulator for this many milliseconds.
    Delayed(u32),
}

impl DebugSettings {
    /// Delivery for one outbound send or inbound dispatch, per the current
    /// latency simulation.
    #[must_use]
    pub fn delivery(&self) -> Delivery {
        match self.latency_sim() {
            Some(ms) => Delivery::Delayed(ms),
            None => Delivery::Immediate,
        }
    }
}

/// Operations the debug handle exposes on the live connection.
pub trait DebugTarget {
    fn transport_state(&self) -> TransportState;
    fn transport_kind(&self) -> TransportKind;
    fn settings(&self) -> &DebugSettings;
    /// Re-open after a developer `disconnect`.
    fn connect(&self);
    /// Close the transport and stop reconnecting.
    fn disconnect(&self);

    fn is_connected(&self) -> bool {
        self.transport_state() == TransportState::Connected
    }
}

thread_local! {
    static DEBUG_SLOT: RefCell<Option<Rc<dyn DebugTarget>>> = const { RefCell::new(None) };
}

/// Install `target` as the process-wide debug handle, replacing any previous one.
pub fn publish(target: Rc<dyn DebugTarget>) {
    let replaced = DEBUG_SLOT.with(|slot| slot.borrow_mut().replace(target).is_some());
    if replaced {
        log::warn!("debug handle replaced; the connection was initialized twice");
    }
}

/// The published handle, if any.
#[must_use]
pub fn published() -> Option<Rc<dyn DebugTarget>> {
    DEBUG_SLOT.with(|slot| slot.borrow().clone())
}

/// Remove the published handle.
pub fn retract() {
    DEBUG_SLOT.with(|slot| drop(slot.borrow_mut().take()));
}

#[cfg(feature = "hydrate")]
pub use self::web::{LiveSocketHandle, expose_on_window};

#[cfg(feature = "hydrate")]
mod web {
    use wasm_bindgen::prelude::*;

    use super::published;
    use crate::consts::DEBUG_GLOBAL;
    use crate::error::BootError;

    /// Console-facing view of the published connection.
    ///
    /// Every method resolves the slot at call time, so the handle stays valid
    /// even if the connection is re-published.
    #[wasm_bindgen]
    #[derive(Clone, Copy, Debug, Default)]
    pub struct LiveSocketHandle {
        _private: (),
    }

    #[wasm_bindgen]
    impl LiveSocketHandle {
        #[wasm_bindgen(js_name = enableDebug)]
        pub fn enable_debug(&self) {
            if let Some(target) = published() {
                target.settings().enable_debug();
            }
        }

        #[wasm_bindgen(js_name = disableDebug)]
        pub fn disable_debug(&self) {
            if let Some(target) = published() {
                target.settings().disable_debug();
            }
        }

        #[wasm_bindgen(js_name = isDebugEnabled)]
        pub fn is_debug_enabled(&self) -> bool {
            published().is_some_and(|t| t.settings().is_debug_enabled())
        }

        #[wasm_bindgen(js_name = enableLatencySim)]
        pub fn enable_latency_sim(&self, ms: u32) {
            if let Some(target) = published() {
                target.settings().enable_latency_sim(ms);
            }
        }

        #[wasm_bindgen(js_name = disableLatencySim)]
        pub fn disable_latency_sim(&self) {
            if let Some(target) = published() {
                target.settings().disable_latency_sim();
            }
        }

        #[wasm_bindgen(js_name = getLatencySim)]
        pub fn latency_sim(&self) -> Option<u32> {
            published().and_then(|t| t.settings().latency_sim())
        }

        #[wasm_bindgen(js_name = isConnected)]
        pub fn is_connected(&self) -> bool {
            published().is_some_and(|t| t.is_connected())
        }

        #[wasm_bindgen(js_name = transportState)]
        pub fn transport_state(&self) -> String {
            published().map_or("uninitialized", |t| t.transport_state().as_str()).to_owned()
        }

        #[wasm_bindgen(js_name = transportKind)]
        pub fn transport_kind(&self) -> String {
            published().map_or("none", |t| t.transport_kind().as_str()).to_owned()
        }

        pub fn connect(&self) {
            if let Some(target) = published() {
                target.connect();
            }
        }

        pub fn disconnect(&self) {
            if let Some(target) = published() {
                target.disconnect();
            }
        }
    }

    /// Assign a [`LiveSocketHandle`] to `window.liveSocket`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::NoWindow`] when there is no window, or
    /// [`BootError::Dom`] if the property cannot be defined.
    pub fn expose_on_window() -> Result<(), BootError> {
        let window = web_sys::window().ok_or(BootError::NoWindow)?;
        let handle = JsValue::from(LiveSocketHandle::default());
        match js_sys::Reflect::set(&window, &JsValue::from_str(DEBUG_GLOBAL), &handle) {
            Ok(true) => Ok(()),
            Ok(false) => Err(BootError::Dom(format!("window.{DEBUG_GLOBAL} is read-only"))),
            Err(e) => Err(BootError::Dom(format!("{e:?}"))),
        }
    }
}
