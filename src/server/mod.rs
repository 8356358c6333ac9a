//! Development server with live reload
//!
//! Pages are rendered per request from the in-memory [`Site`]; files under
//! `source/static` are served as-is. With watching enabled the site is
//! reloaded on change and connected browsers are told to refresh.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Method, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::STATIC_DIR;
use crate::site::Site;
use crate::Blog;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    site: RwLock<Arc<Site>>,
    static_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn new(site: Site, static_dir: PathBuf, live_reload: bool) -> Self {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Self {
            site: RwLock::new(Arc::new(site)),
            static_dir,
            reload_tx,
            live_reload,
        }
    }

    async fn site(&self) -> Arc<Site> {
        self.site.read().await.clone()
    }
}

fn app(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let site = Site::load(blog)?;
    let state = Arc::new(ServerState::new(
        site,
        blog.source_dir.join(STATIC_DIR),
        watch,
    ));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let blog = blog.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&blog, &state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Reload the site whenever content or config changes. Blocks.
fn watch_and_reload(blog: &Blog, state: &ServerState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if blog.source_dir.exists() {
        debouncer
            .watcher()
            .watch(&blog.source_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", blog.source_dir);
    }

    let config_path = blog.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // Config edits can move the source dir, so reopen the blog too
                let reloaded = Blog::new(&blog.base_dir).and_then(|blog| Site::load(&blog));
                match reloaded {
                    Ok(site) => {
                        *state.site.blocking_write() = Arc::new(site);
                        tracing::info!("Site reloaded");
                        let _ = state.reload_tx.send(());
                    }
                    Err(e) => tracing::error!("Reload failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            signal = reload_rx.recv() => match signal {
                // A lagged receiver missed reloads; one is enough
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    if socket.send(Message::Text("reload".to_string())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => {
                // axum answers pings itself
                if matches!(incoming, None | Some(Err(_)) | Some(Ok(Message::Close(_)))) {
                    break;
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve a static file if `ServeDir` finds one, else render the route
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    if path != "/" && matches!(*request.method(), Method::GET | Method::HEAD) {
        let mut service =
            ServeDir::new(&state.static_dir).append_index_html_on_directories(false);
        match service.try_call(request).await {
            Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                return response.into_response();
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to serve {}: {}", path, e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
            }
        }
    }

    let site = state.site().await;
    match site.render_path(&path).await {
        Ok(rendered) => {
            let status = StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::OK);
            let html = if state.live_reload {
                inject_live_reload(&rendered.html)
            } else {
                rendered.html
            };
            (status, Html(html)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::StaticProvider;

    static CONTENT: &[(&str, &str)] = &[(
        "posts/3.md",
        "---\ntitle: Served\ndate: 2024-02-02\n---\nHello *world*.\n",
    )];

    fn state(static_dir: PathBuf, live_reload: bool) -> Arc<ServerState> {
        let site = Site::new(
            SiteConfig::default(),
            Arc::new(StaticProvider::new(CONTENT)),
        )
        .unwrap();
        Arc::new(ServerState::new(site, static_dir, live_reload))
    }

    async fn fetch(state: Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = fallback_handler(State(state), request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_inject_live_reload() {
        let html = "<html><body><p>x</p></body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("/__livereload"));
        assert!(injected.ends_with("</body>\n</html>"));
        assert_eq!(injected.matches("</body>").count(), 1);

        let bare = inject_live_reload("<p>x</p>");
        assert!(bare.starts_with("<p>x</p>"));
        assert!(bare.contains("/__livereload"));
    }

    #[tokio::test]
    async fn test_serves_rendered_post() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = fetch(state(dir.path().to_path_buf(), true), "/posts/3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# 3 Served"));
        assert!(body.contains("<em>world</em>"));
        assert!(body.contains("/__livereload"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path().to_path_buf(), false);

        let (status, body) = fetch(state.clone(), "/posts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.contains("/__livereload"));

        let (status, _) = fetch(state, "/about").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_static_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();

        let (status, body) = fetch(state(dir.path().to_path_buf(), true), "/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");
    }

    #[tokio::test]
    async fn test_serves_static_file_with_encoded_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my file.css"), "p {}").unwrap();

        let (status, body) = fetch(state(dir.path().to_path_buf(), false), "/my%20file.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "p {}");
    }
}
