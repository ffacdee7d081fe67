//!HTTP and websocket server for live telemetry observers.
//!
//!A single configured TCP port serves both the plain HTTP entry point and the
//!websocket endpoint. Observers send `"start"` / `"stop"` control signals and
//!receive one `pacemakerData` event per tick while the emitter is running.

pub(crate) mod server;

use std::net::SocketAddr;

use pacer_core::emitter::EmitterHandle;
use pacer_core::error::PacerBuildError;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{debug, error, info};

use crate::server::connection::WsConnection;

const DEFAULT_WS_PATH: &str = "/ws";

#[derive(Deserialize, Debug, Clone)]
pub struct CorsConfig {
    pub origin: String,
}

#[derive(Deserialize, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub ws_path: Option<String>,
    pub cors: Option<CorsConfig>,
}

pub struct Server {
    pub handle: JoinHandle<()>,
}

impl Server {
    pub async fn try_build(
        cfg: &ServerConfig,
        emitter: EmitterHandle,
    ) -> Result<Server, PacerBuildError> {
        let ws_path = cfg.ws_path.as_deref().unwrap_or(DEFAULT_WS_PATH);

        debug!("building routers ...");
        let mut router = Router::new()
            .route("/", get(index))
            .route(ws_path, get(handle_ws_upgrade))
            .with_state(emitter);

        if let Some(cors_cfg) = &cfg.cors {
            router = router.layer(cors_layer(cors_cfg)?);
        }
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        );

        //bind to 0.0.0.0 on the given port for both http and websocket traffic
        let socket_addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
        info!("server is listening on http://{}", socket_addr);

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::Server::bind(&socket_addr)
                .serve(router.into_make_service())
                .await
            {
                error!("server exited with an error: {}", err);
            }
        });

        Ok(Server { handle })
    }
}

fn cors_layer(cfg: &CorsConfig) -> Result<CorsLayer, PacerBuildError> {
    let origin = cfg.origin.parse::<HeaderValue>().map_err(|err| {
        PacerBuildError::from_string(format!("invalid cors origin {}: {}", cfg.origin, err))
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

async fn index() -> &'static str {
    "pacer telemetry simulator"
}

async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    State(emitter): State<EmitterHandle>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        WsConnection::new(emitter, socket);
    })
}
