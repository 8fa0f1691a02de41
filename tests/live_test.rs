use bitacora::{Catalog, Config, Site};
use std::fs;
use std::net::TcpStream;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

struct Running {
    http: String,
    live: String,
    _public_dir: TempDir,
}

fn start_site() -> Running {
    let _ = env_logger::builder().is_test(true).try_init();

    let public_dir = TempDir::new().expect("Failed to create temp dir");
    for folder in ["1", "2"] {
        let dir = public_dir.path().join("img").join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.png"), b"a").unwrap();
        fs::write(dir.join("b.png"), b"b").unwrap();
    }

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        live_port: 0,
        public_dir: public_dir.path().to_path_buf(),
        ..Config::default()
    };
    let site = Site::bind(&config, Catalog::bundled().unwrap()).expect("Failed to bind site");
    let http = format!("http://127.0.0.1:{}", site.http_addr().unwrap().port());
    let live = format!("ws://127.0.0.1:{}/", site.live_addr().unwrap().port());
    site.spawn();

    Running {
        http,
        live,
        _public_dir: public_dir,
    }
}

fn connect(url: &str) -> Socket {
    let (mut socket, _) = tungstenite::connect(url).expect("Failed to open live channel");
    if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
    }
    socket
}

fn send(socket: &mut Socket, json: &str) {
    socket.send(Message::Text(json.to_string())).unwrap();
}

/// Read renders until one satisfies `accept`, returning its HTML.
fn wait_for_render(socket: &mut Socket, accept: impl Fn(&serde_json::Value) -> bool) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        let message = socket.read().expect("Live channel closed early");
        if let Message::Text(text) = message {
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["type"], "render");
            if accept(&value) {
                return value["html"].as_str().unwrap().to_string();
            }
        }
    }
    panic!("No matching render within 5 seconds");
}

#[test]
fn test_live_session_renders_and_navigates() {
    let site = start_site();
    let mut socket = connect(&site.live);

    // First paint, then the first talk's images arrive
    wait_for_render(&mut socket, |v| v["index"] == 0);
    let html = wait_for_render(&mut socket, |v| {
        v["html"].as_str().unwrap_or_default().contains("/img/1/")
    });
    assert!(html.contains(r#"class="dot"#));

    send(&mut socket, r#"{"type":"next"}"#);
    let html = wait_for_render(&mut socket, |v| v["index"] == 1);
    assert!(html.contains("slide-in"));

    // Selecting the active slide does nothing; previous goes back
    send(&mut socket, r#"{"type":"select_slide","index":1}"#);
    send(&mut socket, r#"{"type":"key","key":"ArrowLeft"}"#);
    wait_for_render(&mut socket, |v| v["index"] == 0);

    socket.close(None).unwrap();
}

#[test]
fn test_live_session_survives_bad_messages() {
    let site = start_site();
    let mut socket = connect(&site.live);
    wait_for_render(&mut socket, |v| v["index"] == 0);

    send(&mut socket, "not json");
    send(&mut socket, r#"{"type":"toggle_questions"}"#);
    let html = wait_for_render(&mut socket, |v| {
        v["html"].as_str().unwrap_or_default().contains(r#"class="expanded""#)
    });
    assert!(html.contains("Preguntas"));

    let health: serde_json::Value = reqwest::blocking::get(format!("{}/api/health", site.http))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(health["live_sessions"], 1);
}
