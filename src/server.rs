// ABOUTME: HTTP server for the bitacora site
// ABOUTME: Serves the landing and carousel pages, the image listing endpoint and static files

use crate::carousel::CarouselView;
use crate::config::Config;
use crate::errors::{BitacoraError, Result};
use crate::html;
use crate::images::{ImageDirectoryLister, ImageListing, ImageSource, LocalImageSource};
use crate::live::{LiveHub, LiveServer};
use crate::resources::{self, PageResources};
use crate::talks::Catalog;
use crate::utils;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tiny_http::{Header, Method, Response, Server, StatusCode};

/// A response before it is handed to tiny_http.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                error!("Failed to encode JSON response: {}", e);
                Self::text(500, "500 Internal Server Error")
            }
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.as_bytes().to_vec(),
        }
    }

    fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    talks: usize,
    live_sessions: usize,
}

/// Request router for the site's HTTP surface.
pub struct SiteServer {
    server: Server,
    hub: Arc<LiveHub>,
    lister: ImageDirectoryLister,
    resources: PageResources,
    live_port: u16,
}

impl SiteServer {
    pub fn bind(
        addr: &str,
        hub: Arc<LiveHub>,
        lister: ImageDirectoryLister,
        resources: PageResources,
        live_port: u16,
    ) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| {
            BitacoraError::ServerError(format!("Failed to start HTTP server on {}: {}", addr, e))
        })?;
        Ok(Self {
            server,
            hub,
            lister,
            resources,
            live_port,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    /// Serve requests until the process exits
    pub fn run(self) {
        if let Some(addr) = self.local_addr() {
            info!("HTTP server listening on http://{}", addr);
        }

        for request in self.server.incoming_requests() {
            let reply = self.route(request.method(), request.url());
            debug!(
                "{} {} -> {}",
                request.method(),
                request.url(),
                reply.status
            );

            let mut response =
                Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
            match Header::from_bytes("Content-Type", reply.content_type) {
                Ok(header) => response = response.with_header(header),
                Err(()) => warn!("Invalid content type {:?}", reply.content_type),
            }

            if let Err(e) = request.respond(response) {
                error!("Failed to send response: {}", e);
            }
        }
    }

    /// Map a request line to a reply
    pub fn route(&self, method: &Method, url: &str) -> Reply {
        if *method != Method::Get {
            return Reply::text(405, "405 Method Not Allowed");
        }

        let path = url.split(['?', '#']).next().unwrap_or("/");
        let path = path.trim_start_matches('/');
        let path = path.strip_suffix('/').unwrap_or(path);

        let mut segments = Vec::new();
        for raw in path.split('/') {
            match urlencoding::decode(raw) {
                Ok(segment) => segments.push(segment.into_owned()),
                Err(_) => return Reply::not_found(),
            }
        }
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match segments.as_slice() {
            [""] => Reply::html(html::render_landing(
                &self.hub.settings(),
                &self.resources,
            )),
            ["charlas"] => Reply::html(self.carousel_page()),
            ["api", "images", folder] => Reply::json(&ImageListing {
                images: self.lister.list(folder),
            }),
            ["api", "health"] => Reply::json(&Health {
                status: "ok",
                talks: self.hub.catalog().len(),
                live_sessions: self.hub.active_sessions(),
            }),
            ["img", rest @ ..] => self.static_image(rest),
            ["assets", name] => match resources::bundled_asset(name) {
                Some(asset) => Reply {
                    status: 200,
                    content_type: asset.content_type,
                    body: asset.body.as_bytes().to_vec(),
                },
                None => Reply::not_found(),
            },
            _ => Reply::not_found(),
        }
    }

    /// First paint of the carousel; the live channel takes over from here.
    fn carousel_page(&self) -> String {
        let mut view = CarouselView::new(self.hub.catalog().clone(), self.hub.settings());
        let talk = view.mount().fetch.unwrap_or_else(|| view.current_talk_id());
        view.images_loaded(talk, Ok(self.lister.list_talk(talk)), Instant::now());
        html::render_carousel_page(&view, self.live_port, &self.resources)
    }

    fn static_image(&self, segments: &[&str]) -> Reply {
        let Some(file_path) = utils::resolve_under(self.lister.root(), segments) else {
            warn!("Rejected image path {:?}", segments);
            return Reply::not_found();
        };

        if !file_path.is_file() {
            return Reply::not_found();
        }

        match fs::read(&file_path) {
            Ok(body) => Reply {
                status: 200,
                content_type: utils::content_type_for(&file_path),
                body,
            },
            Err(e) => {
                error!("Failed to read file {:?}: {}", file_path, e);
                Reply::text(500, "500 Internal Server Error")
            }
        }
    }
}

/// The HTTP server and the live channel, bound and ready to run.
pub struct Site {
    http: SiteServer,
    live: LiveServer,
}

impl Site {
    pub fn bind(config: &Config, catalog: Catalog) -> Result<Self> {
        let lister = ImageDirectoryLister::new(config.image_root());
        if let Err(e) = utils::validate_directory_exists(lister.root()) {
            warn!("Image root unavailable, every talk will show no images: {}", e);
        }

        let source: Arc<dyn ImageSource> = Arc::new(LocalImageSource::new(lister.clone()));
        let hub = LiveHub::new(catalog, config.get_carousel_settings(), source);

        let live = LiveServer::bind(
            &format!("{}:{}", config.host, config.live_port),
            Arc::clone(&hub),
        )?;
        let live_port = live.local_addr()?.port();

        let resources = PageResources::resolve(&config.extra_stylesheets(), config.embed_resources);
        let http = SiteServer::bind(
            &format!("{}:{}", config.host, config.port),
            hub,
            lister,
            resources,
            live_port,
        )?;

        Ok(Self { http, live })
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.local_addr()
    }

    pub fn live_addr(&self) -> Result<SocketAddr> {
        self.live.local_addr()
    }

    pub fn server(&self) -> &SiteServer {
        &self.http
    }

    /// Run both servers on background threads
    pub fn spawn(self) -> (JoinHandle<()>, JoinHandle<()>) {
        (self.http.spawn(), self.live.spawn())
    }

    /// Run the live channel in the background and serve HTTP on this thread
    pub fn run(self) {
        let _live = self.live.spawn();
        self.http.run();
    }
}
