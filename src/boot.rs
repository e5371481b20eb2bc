//! WASM entry point.
//!
//! Runs when the module is instantiated: installs logging and the panic hook,
//! starts the live connection and its progress bar, publishes the debug
//! handle, and on `DOMContentLoaded` applies the stored theme and attaches the
//! preference click listener. The two halves share nothing; a failure in one
//! is logged and leaves the other running.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::BootConfig;
use crate::connection::ConnectionManager;
use crate::debug::{self, DebugSettings};
use crate::dom::WebDocument;
use crate::error::BootError;
use crate::live_socket::LiveSocket;
use crate::storage::{KeyValueStore, StorageArea, WebStorage};
use crate::toggler::{PreferenceToggler, install_click_listener};
use crate::topbar::{Topbar, install_loading_hooks};
use crate::transport::PageOrigin;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let session: Rc<dyn KeyValueStore> = Rc::new(WebStorage::new(StorageArea::Session));
    let settings = DebugSettings::new(Rc::clone(&session));
    let level = if settings.is_debug_enabled() {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if let Err(e) = console_log::init_with_level(level) {
        log::warn!("logger already installed: {e}");
    }

    if let Err(e) = start_connection(&session, settings) {
        log::error!("live connection not started: {e}");
    }
    if let Err(e) = when_dom_ready(start_preferences) {
        log::error!("preference toggles not installed: {e}");
    }
}

fn start_connection(session: &Rc<dyn KeyValueStore>, settings: DebugSettings) -> Result<(), BootError> {
    let document = WebDocument::current()?;
    let config = BootConfig::load(&document);

    let topbar = Topbar::new(config.indicator);
    if let Err(e) = install_loading_hooks(&topbar) {
        log::warn!("progress bar disabled: {e}");
    }

    let Some(manager) = ConnectionManager::initialize(&document, Rc::clone(session)) else {
        return Ok(());
    };
    let socket = LiveSocket::new(manager, settings);
    socket.on_state_change(|from, to| log::info!("live connection {} -> {}", from.as_str(), to.as_str()));
    debug::publish(socket.clone());
    if let Err(e) = debug::expose_on_window() {
        log::warn!("window.liveSocket not available: {e}");
    }
    socket.connect(config.socket, PageOrigin::current()?);
    Ok(())
}

fn start_preferences() {
    let document = match WebDocument::current() {
        Ok(document) => document,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let toggler = Rc::new(PreferenceToggler::new(
        document,
        Rc::new(WebStorage::new(StorageArea::Local)),
    ));
    toggler.initialize_theme();
    if let Err(e) = install_click_listener(toggler) {
        log::error!("click listener not installed: {e}");
    }
}

/// Run `f` once the document has been parsed.
fn when_dom_ready(f: fn()) -> Result<(), BootError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(BootError::NoWindow)?;
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }
    let closure = Closure::once(move |_: web_sys::Event| f());
    document
        .add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref())
        .map_err(|e| BootError::Dom(format!("DOMContentLoaded listener: {e:?}")))?;
    closure.forget();
    Ok(())
}
