//! Bootstrap configuration.
//!
//! Defaults reproduce the stock page setup. A page may override any subset of
//! fields through `<meta name="live-config" content='{...}'>`; missing fields
//! keep their defaults and a malformed document falls back to defaults entirely.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{
    CONFIG_META_NAME, CSRF_PARAM, DEFAULT_BAR_COLOR, DEFAULT_BAR_THICKNESS, DEFAULT_ENDPOINT,
    DEFAULT_FALLBACK_TIMEOUT_MS, DEFAULT_INDICATOR_DELAY_MS, DEFAULT_SHADOW_BLUR, DEFAULT_SHADOW_COLOR, PROTOCOL_VSN,
};
use crate::dom::{Document, Selector};
use crate::error::BootError;

/// Everything the bootstrap can be configured with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub socket: SocketConfig,
    pub indicator: IndicatorConfig,
}

/// Connection options passed to `ConnectionManager::connect`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Mount path of the push endpoint, e.g. `/live`.
    pub endpoint: String,
    /// Milliseconds the websocket gets to connect before long-poll takes over.
    pub fallback_timeout_ms: u32,
    pub params: HandshakeParams,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            fallback_timeout_ms: DEFAULT_FALLBACK_TIMEOUT_MS,
            params: HandshakeParams::default(),
        }
    }
}

/// Query parameters sent with every handshake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeParams {
    /// Filled from the page token at connect time; never read from JSON.
    #[serde(skip)]
    pub csrf_token: String,
    /// Additional application parameters, sent verbatim.
    pub extra: BTreeMap<String, String>,
}

impl HandshakeParams {
    /// Ordered `(name, value)` pairs for the handshake query string.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = vec![(CSRF_PARAM, self.csrf_token.as_str())];
        pairs.extend(
            self.extra
                .iter()
                .filter(|(k, _)| k.as_str() != CSRF_PARAM && k.as_str() != "vsn")
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        pairs.push(("vsn", PROTOCOL_VSN));
        pairs
    }
}

/// Appearance and timing of the navigation progress bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Debounce before the bar becomes visible.
    pub delay_ms: u32,
    pub bar_thickness: f64,
    pub bar_colors: Vec<ColorStop>,
    pub shadow_blur: f64,
    pub shadow_color: Option<String>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_INDICATOR_DELAY_MS,
            bar_thickness: DEFAULT_BAR_THICKNESS,
            bar_colors: vec![ColorStop {
                offset: 0.0,
                color: DEFAULT_BAR_COLOR.to_owned(),
            }],
            shadow_blur: DEFAULT_SHADOW_BLUR,
            shadow_color: Some(DEFAULT_SHADOW_COLOR.to_owned()),
        }
    }
}

/// One stop of the bar's horizontal gradient; `offset` is in `0.0..=1.0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

impl BootConfig {
    /// Parse a JSON override on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Config`] when `raw` is not a valid config document.
    pub fn from_json(raw: &str) -> Result<Self, BootError> {
        let mut config: Self = serde_json::from_str(raw).map_err(|e| BootError::Config(e.to_string()))?;
        config.indicator.bar_colors.retain(|stop| (0.0..=1.0).contains(&stop.offset));
        if config.indicator.bar_colors.is_empty() {
            config.indicator.bar_colors = IndicatorConfig::default().bar_colors;
        }
        Ok(config)
    }

    /// Resolve the configuration for the current page.
    pub fn load<D: Document>(doc: &D) -> Self {
        let Some(meta) = doc.query(&Selector::MetaName(CONFIG_META_NAME)) else {
            return Self::default();
        };
        let Some(raw) = doc.attribute(&meta, "content") else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => {
                log::debug!("loaded page configuration override");
                config
            }
            Err(e) => {
                log::warn!("ignoring page configuration: {e}");
                Self::default()
            }
        }
    }
}
