//! Race settings
//!
//! Picks the control scheme and the world variant. Resolved once at start-up
//! from defaults, an optional inline JSON block, then URL query parameters.

use serde::{Deserialize, Serialize};

/// Control scheme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Steering wheel + throttle/brake pedals
    #[default]
    Wheel,
    /// Left steering stick, right drive stick, brake button
    Joystick,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Wheel => "wheel",
            ControlMode::Joystick => "joystick",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wheel" | "pedals" => Some(ControlMode::Wheel),
            "joystick" | "sticks" => Some(ControlMode::Joystick),
            _ => None,
        }
    }
}

/// World variant selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorldMode {
    /// Barriered circuit with lane-following opponent cars and laps
    #[default]
    Circuit,
    /// Open road of recycled obstacles scored by near passes
    Gauntlet,
}

impl WorldMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldMode::Circuit => "circuit",
            WorldMode::Gauntlet => "gauntlet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "circuit" | "opponents" => Some(WorldMode::Circuit),
            "gauntlet" | "obstacles" => Some(WorldMode::Gauntlet),
            _ => None,
        }
    }
}

/// Start-up settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controls: ControlMode,
    pub world: WorldMode,
    /// Fixed RNG seed; a clock-derived seed is used when absent
    pub seed: Option<u64>,
}

impl Settings {
    /// DOM id of the optional inline JSON settings block
    pub const ELEMENT_ID: &'static str = "race-settings";

    /// Parse a JSON settings document; missing fields take defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring malformed race settings: {}", e);
                None
            }
        }
    }

    /// Apply `key=value` pairs from a URL query string (leading `?` optional)
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "controls" => match ControlMode::from_str(value) {
                    Some(mode) => self.controls = mode,
                    None => log::warn!("Unknown controls '{}'", value),
                },
                "world" => match WorldMode::from_str(value) {
                    Some(mode) => self.world = mode,
                    None => log::warn!("Unknown world '{}'", value),
                },
                "seed" => match value.parse() {
                    Ok(seed) => self.seed = Some(seed),
                    Err(_) => log::warn!("Bad seed '{}'", value),
                },
                _ => {}
            }
        }
    }

    /// Defaults, then inline JSON, then query parameters
    pub fn resolve(json: Option<&str>, query: &str) -> Self {
        let mut settings = json.and_then(Self::from_json).unwrap_or_default();
        settings.apply_query(query);
        settings
    }

    /// Resolve settings from the host page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = web_sys::window();
        let json = window
            .as_ref()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());
        let query = window
            .as_ref()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();

        let settings = Self::resolve(json.as_deref(), &query);
        log::info!(
            "Settings: controls={} world={} seed={:?}",
            settings.controls.as_str(),
            settings.world.as_str(),
            settings.seed
        );
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
