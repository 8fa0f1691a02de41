// ABOUTME: Page resources for the bitacora site
// ABOUTME: Bundled carousel assets plus optional local or remote stylesheets

use crate::errors::{BitacoraError, Result};
use log::{info, warn};
use quick_xml::escape::escape;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A file compiled into the binary and served under `/assets/`.
#[derive(Debug)]
pub struct Asset {
    pub name: &'static str,
    pub content_type: &'static str,
    pub body: &'static str,
}

pub const CAROUSEL_CSS: Asset = Asset {
    name: "carousel.css",
    content_type: "text/css; charset=utf-8",
    body: include_str!("../assets/carousel.css"),
};

pub const CAROUSEL_JS: Asset = Asset {
    name: "carousel.js",
    content_type: "application/javascript; charset=utf-8",
    body: include_str!("../assets/carousel.js"),
};

const BUNDLED_ASSETS: [&Asset; 2] = [&CAROUSEL_CSS, &CAROUSEL_JS];

/// Look up a bundled asset by file name
pub fn bundled_asset(name: &str) -> Option<&'static Asset> {
    BUNDLED_ASSETS.iter().copied().find(|asset| asset.name == name)
}

/// Represents a resource file that can be either local or remote.
#[derive(Debug, Clone)]
pub struct ResourceFile {
    pub path: String,
    pub is_remote: bool,
}

impl ResourceFile {
    /// Create a new ResourceFile from a path string.
    /// The path can be either a local file path or a URL.
    pub fn new(path: &str) -> Self {
        let is_remote = path.starts_with("http://") || path.starts_with("https://");
        Self {
            path: path.to_string(),
            is_remote,
        }
    }

    fn content(&self) -> Result<String> {
        if self.is_remote {
            self.fetch_remote_content()
        } else {
            self.read_local_content()
        }
    }

    /// Fetch content from a remote URL with retry capability
    fn fetch_remote_content(&self) -> Result<String> {
        info!("Fetching remote resource: {}", self.path);

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(BitacoraError::FetchError)?;

        let mut retry_delay = 500;
        let mut last_error = None;

        for attempt in 1..=3 {
            match client.get(&self.path).send() {
                Ok(response) if response.status().is_success() => {
                    return response.text().map_err(BitacoraError::FetchError);
                }
                Ok(response) => {
                    last_error = Some(BitacoraError::ValidationError(format!(
                        "HTTP error: {}",
                        response.status()
                    )));
                }
                Err(e) => last_error = Some(BitacoraError::FetchError(e)),
            }

            info!(
                "Fetch attempt {} failed, retrying in {} ms",
                attempt, retry_delay
            );
            std::thread::sleep(Duration::from_millis(retry_delay));
            retry_delay *= 2;
        }

        Err(last_error.unwrap_or_else(|| {
            BitacoraError::ValidationError("Unknown error fetching resource".to_string())
        }))
    }

    fn read_local_content(&self) -> Result<String> {
        info!("Reading local resource: {}", self.path);
        let path = Path::new(&self.path);
        if !path.exists() {
            return Err(BitacoraError::PathNotFoundError(path.to_path_buf()));
        }
        fs::read_to_string(path).map_err(BitacoraError::FileReadError)
    }

    /// Stylesheet tag for the resource, embedding local content when `embed` is set.
    pub fn tag(&self, embed: bool) -> Result<String> {
        if self.is_remote || !embed {
            let href = escape(self.path.as_str());
            Ok(format!(r#"<link rel="stylesheet" href="{}">"#, href))
        } else {
            Ok(format!("<style>{}</style>", self.content()?))
        }
    }
}

/// Extra `<head>` markup, resolved once when the site starts.
#[derive(Debug, Clone, Default)]
pub struct PageResources {
    head: String,
}

impl PageResources {
    /// Resolve extra stylesheets. A resource that cannot be loaded is skipped.
    pub fn resolve(stylesheets: &[ResourceFile], embed: bool) -> Self {
        let mut head = String::new();
        for css in stylesheets {
            match css.tag(embed) {
                Ok(tag) => {
                    head.push_str(&tag);
                    head.push('\n');
                }
                Err(e) => warn!("Failed to include CSS resource {}: {}", css.path, e),
            }
        }
        Self { head }
    }

    pub fn head(&self) -> &str {
        &self.head
    }
}
