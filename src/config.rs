// ABOUTME: Configuration module for the bitacora site
// ABOUTME: Provides configuration settings and environment variable handling

use crate::resources::ResourceFile;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Delay before a committed slide change, during which navigation is locked.
pub const TRANSITION_MS: u64 = 300;
/// Interval between automatic image advances.
pub const ROTATION_MS: u64 = 4000;
/// Horizontal drag distance, in logical pixels, that counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 75.0;
/// How long the landing page stays up before moving on to the carousel.
pub const LANDING_DELAY_MS: u64 = 3000;

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub live_port: u16,
    pub public_dir: PathBuf,
    pub data_path: Option<PathBuf>,
    pub extra_css: Vec<String>,
    pub embed_resources: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            live_port: 8081,
            public_dir: PathBuf::from("public"),
            data_path: None,
            extra_css: Vec::new(),
            embed_resources: true,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("BITACORA_HOST").unwrap_or(defaults.host);
        let port = env::var("BITACORA_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let live_port = env::var("BITACORA_LIVE_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.live_port);
        let public_dir = env::var("BITACORA_PUBLIC_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.public_dir);
        let data_path = env::var("BITACORA_DATA").ok().map(PathBuf::from);
        let extra_css = env::var("BITACORA_EXTRA_CSS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let embed_resources = env::var("BITACORA_EMBED_RESOURCES")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            host,
            port,
            live_port,
            public_dir,
            data_path,
            extra_css,
            embed_resources,
        }
    }

    /// Directory holding the per-talk image folders
    pub fn image_root(&self) -> PathBuf {
        self.public_dir.join("img")
    }

    /// Extra stylesheets as resource files
    pub fn extra_stylesheets(&self) -> Vec<ResourceFile> {
        self.extra_css.iter().map(|p| ResourceFile::new(p)).collect()
    }

    /// Get carousel timings with the fixed defaults
    pub fn get_carousel_settings(&self) -> CarouselSettings {
        CarouselSettings::default()
    }
}

/// Timings and thresholds that drive a carousel instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselSettings {
    pub transition: Duration,
    pub rotation: Duration,
    pub swipe_threshold: f64,
    pub landing_delay: Duration,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(TRANSITION_MS),
            rotation: Duration::from_millis(ROTATION_MS),
            swipe_threshold: SWIPE_THRESHOLD_PX,
            landing_delay: Duration::from_millis(LANDING_DELAY_MS),
        }
    }
}
