//! Local preview server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::commands;
use crate::generator::manifest::read_manifest;
use crate::helpers::article_page;
use crate::hydrate::{HydrationSession, Hydrator};
use crate::Site;

/// Live reload script injected into article pages
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

struct ServerState {
    site: Site,
    hydrator: Hydrator<'static>,
    session: Mutex<HydrationSession>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Build the preview router
pub fn router(site: Site, live_reload: bool) -> Result<(Router, broadcast::Sender<()>)> {
    let (reload_tx, _) = broadcast::channel::<()>(16);
    let hydrator = Hydrator::new(&site.config.hydration)?;

    let state = Arc::new(ServerState {
        site,
        hydrator,
        session: Mutex::new(HydrationSession::new()),
        reload_tx: reload_tx.clone(),
        live_reload,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/posts.json", get(manifest_handler))
        .route("/blog/:slug", get(post_handler))
        .fallback(static_handler)
        .with_state(state.clone());

    if live_reload {
        let watch_state = state;
        tokio::task::spawn_blocking(move || {
            let result = commands::build::watch(&watch_state.site, |_| {
                let torn_down = lock_session(&watch_state.session).teardown_all();
                tracing::debug!("Rebuilt, tore down {} mount(s)", torn_down);
                let _ = watch_state.reload_tx.send(());
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    Ok((app, reload_tx))
}

/// Start the preview server
pub async fn start(site: &Site, port: u16, watch: bool) -> Result<()> {
    let (app, _reload_tx) = router(site.clone(), watch)?;

    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;
    println!("Preview running at http://localhost:{}", port);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn lock_session(session: &Mutex<HydrationSession>) -> std::sync::MutexGuard<'_, HydrationSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn manifest_handler(State(state): State<Arc<ServerState>>) -> Response {
    match read_manifest(&state.site.manifest_path) {
        Ok(Some(records)) => Json(records).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Manifest not built").into_response(),
        Err(e) => {
            tracing::error!("{:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid manifest").into_response()
        }
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let (record, fragment) = match commands::hydrate::load_post(&state.site, &slug) {
        Ok(Some(post)) => post,
        Ok(None) => return (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("{:#}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    };

    let hydrated = {
        let mut session = lock_session(&state.session);
        state.hydrator.hydrate(&mut session, &record.slug, &fragment)
    };

    match hydrated {
        Ok(hydrated) => {
            let page = article_page(&record.title, &hydrated.html);
            if state.live_reload {
                Html(inject_live_reload(&page)).into_response()
            } else {
                Html(page).into_response()
            }
        }
        Err(e) => {
            tracing::error!("Failed to hydrate {}: {:#}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Serve built assets from the public mirror
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let Some(public_dir) = state.site.public_dir.clone() else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    // Asset URLs carry the configured prefix; the mirror directory does not
    let prefix = state.site.config.asset_url_prefix.trim_end_matches('/');
    let path = request.uri().path();
    let path = match path.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    };

    let (mut parts, body) = request.into_parts();
    parts.uri = match path.parse() {
        Ok(uri) => uri,
        Err(_) => return (StatusCode::BAD_REQUEST, "Bad path").into_response(),
    };

    let mut service = ServeDir::new(public_dir);
    match service.try_call(Request::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

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
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}
