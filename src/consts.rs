//! Page contract constants: selectors, storage keys, event names, defaults.

// ── Security token ──────────────────────────────────────────────

/// `name` of the `<meta>` element carrying the CSRF token.
pub const CSRF_META_NAME: &str = "csrf-token";

/// Attribute on the token element holding the token value.
pub const CSRF_META_ATTR: &str = "content";

/// Handshake parameter name the server expects the token under.
pub const CSRF_PARAM: &str = "_csrf_token";

// ── Transport ───────────────────────────────────────────────────

/// Mount path of the push-update endpoint.
pub const DEFAULT_ENDPOINT: &str = "/live";

/// How long the websocket may take to connect before falling back to long-poll.
pub const DEFAULT_FALLBACK_TIMEOUT_MS: u32 = 2500;

/// Protocol version advertised in the handshake query.
pub const PROTOCOL_VSN: &str = "2.0.0";

/// Stepped reconnect delays in milliseconds, indexed by attempt.
pub const RECONNECT_STEPS_MS: [u32; 9] = [10, 50, 100, 150, 200, 250, 500, 1000, 2000];

/// Reconnect delay once the stepped schedule is exhausted.
pub const RECONNECT_CEILING_MS: u32 = 5000;

/// Poll interval used by the long-poll driver between empty responses.
pub const LONG_POLL_IDLE_MS: u32 = 100;

// ── Lifecycle events ────────────────────────────────────────────

pub const EVENT_PAGE_LOADING_START: &str = "phx:page-loading-start";
pub const EVENT_PAGE_LOADING_STOP: &str = "phx:page-loading-stop";

// ── Progress indicator ──────────────────────────────────────────

/// Minimum time a loading cycle must last before the bar appears.
pub const DEFAULT_INDICATOR_DELAY_MS: u32 = 300;

pub const DEFAULT_BAR_COLOR: &str = "#29d";
pub const DEFAULT_SHADOW_COLOR: &str = "rgba(0, 0, 0, .3)";
pub const DEFAULT_BAR_THICKNESS: f64 = 3.0;
pub const DEFAULT_SHADOW_BLUR: f64 = 10.0;

/// Frame interval for the bar animation (~60 fps).
pub const INDICATOR_FRAME_MS: u32 = 16;

/// Opacity removed per frame while the bar fades out.
pub const INDICATOR_FADE_STEP: f64 = 0.08;

// ── Preferences ─────────────────────────────────────────────────

/// `localStorage` key for the theme flag.
pub const THEME_STORAGE_KEY: &str = "darkMode";

/// Class applied to `<html>` while the dark theme is active.
pub const DARK_CLASS: &str = "dark";

pub const THEME_TOGGLE_MARKER: &str = "data-toggle-dark-mode";
pub const MENU_TOGGLE_MARKER: &str = "data-toggle-mobile-menu";

pub const MENU_CONTAINER_CLASS: &str = "mobile-menu";
pub const MENU_OPEN_ICON_CLASS: &str = "mobile-menu-open";
pub const MENU_CLOSED_ICON_CLASS: &str = "mobile-menu-closed";

/// Utility class that hides an element.
pub const HIDDEN_CLASS: &str = "hidden";

// ── Session-scoped developer settings ───────────────────────────

pub const DEBUG_SESSION_KEY: &str = "phx:live-socket:debug";
pub const LATENCY_SIM_SESSION_KEY: &str = "phx:live-socket:latency-sim";
pub const LONG_POLL_FALLBACK_SESSION_KEY: &str = "phx:fallback:LongPoll";

/// Property on `window` exposing the live connection handle.
pub const DEBUG_GLOBAL: &str = "liveSocket";

// ── Configuration ───────────────────────────────────────────────

/// `name` of the optional `<meta>` element carrying a JSON config override.
pub const CONFIG_META_NAME: &str = "live-config";
