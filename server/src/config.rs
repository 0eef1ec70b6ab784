//! Server configuration
//!
//! Configuration is loaded from environment variables: `HOST`, `PORT`,
//! `GEOFENCE_COLLECTION`, `STORE_PAGE_SIZE`, `STORE_MAX_VERTICES`,
//! `STORE_REJECT_DUPLICATES`, `OVERLAY_FILL_COLOR`, `OVERLAY_OPACITY` and
//! `OVERLAY_HOVER_OPACITY`. Unset or unparseable values keep their defaults.

use std::env;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Geofence collection this server edits
    pub collection: String,

    /// Geofence store configuration
    pub store: StoreConfig,

    /// Map overlay configuration
    pub overlay: OverlayConfig,
}

/// What the backend does when a geofence id is put twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Replace the stored geometry (upsert)
    #[default]
    Overwrite,
    /// Fail the second put with a conflict
    Reject,
}

/// Geofence store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Geofences returned per listing page
    pub page_size: usize,
    /// Most vertices an outer ring may have
    pub max_vertices: usize,
    /// Behavior on duplicate ids
    pub conflict_policy: ConflictPolicy,
}

/// Map overlay configuration
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Fill color of every geofence overlay
    pub fill_color: String,
    /// Fill opacity when not hovered
    pub opacity: f64,
    /// Fill opacity while hovered
    pub hover_opacity: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            collection: "geofences".to_string(),
            store: StoreConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_vertices: 1000,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fill_color: "orange".to_string(),
            opacity: 0.4,
            hover_opacity: 1.0,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server config
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if let Some(name) = lookup("GEOFENCE_COLLECTION")
            && !name.is_empty()
        {
            config.collection = name;
        }

        // Store config
        if let Some(val) = lookup("STORE_PAGE_SIZE")
            && let Ok(size) = val.parse::<usize>()
            && size > 0
        {
            config.store.page_size = size;
        }
        if let Some(val) = lookup("STORE_MAX_VERTICES")
            && let Ok(v) = val.parse()
        {
            config.store.max_vertices = v;
        }
        if let Some(val) = lookup("STORE_REJECT_DUPLICATES") {
            config.store.conflict_policy = if parse_flag(&val) {
                ConflictPolicy::Reject
            } else {
                ConflictPolicy::Overwrite
            };
        }

        // Overlay config
        if let Some(color) = lookup("OVERLAY_FILL_COLOR")
            && !color.is_empty()
        {
            config.overlay.fill_color = color;
        }
        if let Some(val) = lookup("OVERLAY_OPACITY")
            && let Ok(v) = val.parse::<f64>()
            && (0.0..=1.0).contains(&v)
        {
            config.overlay.opacity = v;
        }
        if let Some(val) = lookup("OVERLAY_HOVER_OPACITY")
            && let Ok(v) = val.parse::<f64>()
            && (0.0..=1.0).contains(&v)
        {
            config.overlay.hover_opacity = v;
        }

        config
    }
}
