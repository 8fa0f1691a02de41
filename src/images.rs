// ABOUTME: Image discovery for the bitacora site
// ABOUTME: Lists each talk's image folder and fetches listings locally or over HTTP

use crate::errors::{BitacoraError, Result};
use crate::talks::TalkId;
use crate::utils;
use image::ImageFormat;
use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// URL prefix under which the image root is published.
pub const PUBLIC_IMAGE_PREFIX: &str = "/img";

/// Body of `GET /api/images/{folder}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageListing {
    pub images: Vec<String>,
}

/// Image path guessed for a talk when its listing could not be fetched.
pub fn fallback_image_path(talk: TalkId) -> String {
    format!("{}/{}/1.jpg", PUBLIC_IMAGE_PREFIX, talk)
}

/// Only PNG, JPEG, GIF and WebP files are shown, whatever the case of the extension.
pub fn is_allowed_image(path: &Path) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    matches!(
        ImageFormat::from_extension(ext),
        Some(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP)
    )
}

/// Scans `<root>/<folder>` and maps the image files to public paths.
#[derive(Debug, Clone)]
pub struct ImageDirectoryLister {
    root: PathBuf,
    public_prefix: String,
}

impl ImageDirectoryLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: PUBLIC_IMAGE_PREFIX.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the images of one folder.
    ///
    /// Never fails: a missing folder, an unsafe folder name or a read error all
    /// come back as an empty list. Entries keep the order the filesystem yields.
    pub fn list(&self, folder: &str) -> Vec<String> {
        if !utils::is_plain_segment(folder) {
            warn!("Refusing to list image folder {:?}", folder);
            return Vec::new();
        }

        let dir = self.root.join(folder);
        if !dir.exists() {
            debug!("No image folder at {:?}", dir);
            return Vec::new();
        }

        match self.scan(folder, &dir) {
            Ok(images) => {
                debug!("Found {} images in {:?}", images.len(), dir);
                images
            }
            Err(e) => {
                error!("Error reading images from {:?}: {}", dir, e);
                Vec::new()
            }
        }
    }

    pub fn list_talk(&self, talk: TalkId) -> Vec<String> {
        self.list(&talk.to_string())
    }

    fn scan(&self, folder: &str, dir: &Path) -> io::Result<Vec<String>> {
        let mut images = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!("Skipping image with non UTF-8 name in {:?}", dir);
                continue;
            };

            if is_allowed_image(Path::new(name)) {
                images.push(format!("{}/{}/{}", self.public_prefix, folder, name));
            }
        }
        Ok(images)
    }
}

/// Where a carousel gets a talk's image set from.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, talk: TalkId) -> Result<Vec<String>>;
}

/// Reads the image store directly.
#[derive(Debug, Clone)]
pub struct LocalImageSource {
    lister: ImageDirectoryLister,
}

impl LocalImageSource {
    pub fn new(lister: ImageDirectoryLister) -> Self {
        Self { lister }
    }
}

impl ImageSource for LocalImageSource {
    fn fetch(&self, talk: TalkId) -> Result<Vec<String>> {
        Ok(self.lister.list_talk(talk))
    }
}

/// Calls the listing endpoint of a running site. Failures are reported once,
/// not retried.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
    base: Url,
}

impl HttpImageSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(BitacoraError::FetchError)?;

        Ok(Self { client, base })
    }

    fn listing_url(&self, talk: TalkId) -> Result<Url> {
        Ok(self.base.join(&format!("api/images/{}", talk))?)
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, talk: TalkId) -> Result<Vec<String>> {
        let url = self.listing_url(talk)?;
        info!("Fetching image listing: {}", url);

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(BitacoraError::ValidationError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let listing: ImageListing = response.json()?;
        Ok(listing.images)
    }
}
