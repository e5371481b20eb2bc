//! Browser bootstrap for a server-rendered, live-updating UI.
//!
//! This crate is compiled to WebAssembly and loaded by every page. It does two
//! unrelated jobs: it keeps one live connection to the push-update endpoint
//! (with long-poll fallback, stepped reconnects and a debounced progress bar)
//! and it handles the theme and mobile-menu toggles through a single delegated
//! click listener. Everything that decides behaviour is plain Rust that runs
//! natively in tests against an in-memory document and store; the browser
//! bindings live behind the `hydrate` feature.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`connection`] | Connection lifecycle state machine returning effects |
//! | [`executor`] | Attempt-scoped transport handle, listeners, effect routing |
//! | [`transport`] | Transport states and kinds, backoff, handshake URLs |
//! | [`indicator`] | Progress bar debounce and animation model |
//! | [`debug`] | Session debug settings and the process-wide debug handle |
//! | [`toggler`] | Theme and menu routes on one delegated click listener |
//! | [`theme`] | Stored theme flag and the root `dark` class |
//! | [`menu`] | Three-element mobile menu flip |
//! | [`delegate`] | Ordered first-match click delegation |
//! | [`dom`] | Document abstraction, in-memory and `web-sys` backed |
//! | [`storage`] | Key-value store abstraction and browser storage |
//! | [`config`] | Connection and progress bar configuration |
//! | [`consts`] | Selectors, keys, event names and defaults |
//! | [`error`] | Crate error type |
//!
//! With `hydrate`: `boot` (entry point), `live_socket` (browser host for the
//! executor: transports, timers, loading events), `topbar` (canvas progress bar).

pub mod config;
pub mod connection;
pub mod consts;
pub mod debug;
pub mod delegate;
pub mod dom;
pub mod error;
pub mod executor;
pub mod indicator;
pub mod menu;
pub mod storage;
pub mod theme;
pub mod toggler;
pub mod transport;

#[cfg(feature = "hydrate")]
pub mod boot;
#[cfg(feature = "hydrate")]
pub mod live_socket;
#[cfg(feature = "hydrate")]
pub mod topbar;
