// ABOUTME: Live carousel sessions for the bitacora site
// ABOUTME: Drives one carousel per WebSocket connection and pushes rendered HTML to the browser

use crate::carousel::{CarouselView, Input, Update};
use crate::config::CarouselSettings;
use crate::errors::{BitacoraError, Result};
use crate::images::ImageSource;
use crate::talks::{Catalog, TalkId};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tungstenite::{Message, WebSocket};
use uuid::Uuid;

/// Longest a session waits for input before checking its timers again.
const MAX_POLL: Duration = Duration::from_millis(50);
const MIN_POLL: Duration = Duration::from_millis(5);

type FetchResult = (TalkId, Result<Vec<String>>);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Render { html: String, index: usize },
}

#[derive(Debug, Clone)]
struct SessionInfo {
    peer: SocketAddr,
    opened: Instant,
}

/// Shared state handed to every live session.
pub struct LiveHub {
    catalog: Catalog,
    settings: CarouselSettings,
    source: Arc<dyn ImageSource>,
    sessions: Mutex<HashMap<Uuid, SessionInfo>>,
}

impl LiveHub {
    pub fn new(
        catalog: Catalog,
        settings: CarouselSettings,
        source: Arc<dyn ImageSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            settings,
            source,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> CarouselSettings {
        self.settings
    }

    fn register(self: &Arc<Self>, peer: SocketAddr) -> SessionGuard {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock();
        sessions.insert(
            id,
            SessionInfo {
                peer,
                opened: Instant::now(),
            },
        );
        info!(
            "Live session {} opened from {} ({} active)",
            id,
            peer,
            sessions.len()
        );
        SessionGuard {
            hub: Arc::clone(self),
            id,
        }
    }
}

/// Removes the session from the registry however the session ends.
struct SessionGuard {
    hub: Arc<LiveHub>,
    id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(info) = self.hub.sessions.lock().remove(&self.id) {
            info!(
                "Live session {} from {} closed after {:.1}s",
                self.id,
                info.peer,
                info.opened.elapsed().as_secs_f64()
            );
        }
    }
}

/// WebSocket listener for the live carousel channel.
pub struct LiveServer {
    listener: TcpListener,
    hub: Arc<LiveHub>,
}

impl LiveServer {
    pub fn bind(addr: &str, hub: Arc<LiveHub>) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            BitacoraError::ServerError(format!("Failed to bind live channel on {}: {}", addr, e))
        })?;
        Ok(Self { listener, hub })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(BitacoraError::FileReadError)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    /// Accept connections forever, one thread per session
    pub fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!("Live channel listening on ws://{}", addr);
        }

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let hub = Arc::clone(&self.hub);
                    thread::spawn(move || {
                        if let Err(e) = run_session(hub, stream) {
                            warn!("Live session ended with error: {}", e);
                        }
                    });
                }
                Err(e) => error!("Failed to accept live connection: {}", e),
            }
        }
    }
}

fn run_session(hub: Arc<LiveHub>, stream: TcpStream) -> Result<()> {
    let peer = stream.peer_addr().map_err(BitacoraError::FileReadError)?;
    let mut socket = tungstenite::accept(stream).map_err(|e| {
        BitacoraError::ServerError(format!("WebSocket handshake with {} failed: {}", peer, e))
    })?;
    let _guard = hub.register(peer);

    let mut view = CarouselView::new(hub.catalog.clone(), hub.settings);
    let (tx, rx) = mpsc::channel();

    let update = view.mount();
    apply(&hub, &mut socket, &view, update, &tx)?;

    loop {
        let update = poll_background(&mut view, &rx);
        apply(&hub, &mut socket, &view, update, &tx)?;

        socket
            .get_ref()
            .set_read_timeout(Some(poll_timeout(&view)))
            .map_err(BitacoraError::FileReadError)?;

        match socket.read() {
            Ok(Message::Text(text)) => match serde_json::from_str::<Input>(&text) {
                Ok(input) => {
                    debug!("Input from {}: {:?}", peer, input);
                    let update = view.handle(input, Instant::now());
                    apply(&hub, &mut socket, &view, update, &tx)?;
                }
                Err(e) => warn!("Unreadable message from {}: {}", peer, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Collect finished image fetches and fire due timers.
fn poll_background(view: &mut CarouselView, rx: &Receiver<FetchResult>) -> Update {
    let mut update = Update::default();
    while let Ok((talk, result)) = rx.try_recv() {
        let loaded = view.images_loaded(talk, result, Instant::now());
        update.redraw |= loaded.redraw;
    }

    let ticked = view.tick(Instant::now());
    update.redraw |= ticked.redraw;
    update.fetch = ticked.fetch;
    update
}

fn poll_timeout(view: &CarouselView) -> Duration {
    let until_deadline = view
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()))
        .unwrap_or(MAX_POLL);
    until_deadline.clamp(MIN_POLL, MAX_POLL)
}

fn apply(
    hub: &LiveHub,
    socket: &mut WebSocket<TcpStream>,
    view: &CarouselView,
    update: Update,
    tx: &Sender<FetchResult>,
) -> Result<()> {
    if let Some(talk) = update.fetch {
        spawn_fetch(Arc::clone(&hub.source), talk, tx.clone());
    }

    if update.redraw {
        let message = ServerMessage::Render {
            html: view.render(),
            index: view.navigation().current_index,
        };
        socket.send(Message::Text(serde_json::to_string(&message)?))?;
    }

    Ok(())
}

fn spawn_fetch(source: Arc<dyn ImageSource>, talk: TalkId, tx: Sender<FetchResult>) {
    thread::spawn(move || {
        let result = source.fetch(talk);
        // The session may already be gone
        let _ = tx.send((talk, result));
    });
}
