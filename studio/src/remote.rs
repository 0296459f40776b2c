use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use engine::clock::MIN_PERIOD;
use engine::editor::{ActionRequest, EditorManifest};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};

use crate::actions::{self, action_from_id};
use crate::catalog::{Catalog, GameMetadata};
use crate::metrics::RandomSource;
use crate::prompt::StudioSettings;
use crate::runtime::{RuntimeSession, RuntimeSnapshot};
use crate::surface::{Notification, RecentSurface};
use crate::upload::DropOutcome;

pub const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("unknown actionId: {0}")]
    UnknownActionId(String),
    #[error("unknown gameId: {0}")]
    UnknownGameId(String),
    #[error("runtime session is not running")]
    SessionClosed,
    #[error("runtime session did not respond")]
    NoResponse,
    #[error("runtime session timed out")]
    TimedOut,
}

impl RemoteError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownActionId(_) => StatusCode::BAD_REQUEST,
            Self::UnknownGameId(_) => StatusCode::NOT_FOUND,
            Self::SessionClosed | Self::NoResponse => StatusCode::SERVICE_UNAVAILABLE,
            Self::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for RemoteError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[derive(Debug)]
pub enum RemoteCmd {
    GetState {
        respond: oneshot::Sender<RuntimeSnapshot>,
    },
    Select {
        game: GameMetadata,
        respond: oneshot::Sender<RuntimeSnapshot>,
    },
    Action {
        action_id: String,
        respond: oneshot::Sender<Result<RuntimeSnapshot, RemoteError>>,
    },
    Upload {
        file_names: Vec<String>,
        respond: oneshot::Sender<UploadResponse>,
    },
    SetStudio {
        settings: StudioSettings,
        respond: oneshot::Sender<RuntimeSnapshot>,
    },
    Notifications {
        respond: oneshot::Sender<Vec<Notification>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub accepted: bool,
    pub archive: Option<String>,
    pub snapshot: RuntimeSnapshot,
}

#[derive(Clone)]
struct RemoteState {
    tx: mpsc::UnboundedSender<RemoteCmd>,
    catalog: Arc<dyn Catalog + Send + Sync>,
}

async fn health() -> &'static str {
    "ok"
}

async fn manifest() -> Json<EditorManifest> {
    Json(actions::default_manifest())
}

async fn list_catalog(State(state): State<RemoteState>) -> Json<Vec<GameMetadata>> {
    Json(state.catalog.list_games())
}

async fn send_cmd<T>(
    tx: &mpsc::UnboundedSender<RemoteCmd>,
    cmd: RemoteCmd,
    rx: oneshot::Receiver<T>,
) -> Result<T, RemoteError> {
    tx.send(cmd).map_err(|_| RemoteError::SessionClosed)?;

    match tokio::time::timeout(REPLY_TIMEOUT, rx).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(_)) => Err(RemoteError::NoResponse),
        Err(_) => Err(RemoteError::TimedOut),
    }
}

async fn session_state(
    State(state): State<RemoteState>,
) -> Result<Json<RuntimeSnapshot>, RemoteError> {
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(&state.tx, RemoteCmd::GetState { respond: tx }, rx).await?;
    Ok(Json(snapshot))
}

async fn session_select(
    State(state): State<RemoteState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<RuntimeSnapshot>, RemoteError> {
    let game = state
        .catalog
        .find(&payload.game_id)
        .ok_or(RemoteError::UnknownGameId(payload.game_id))?;

    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(&state.tx, RemoteCmd::Select { game, respond: tx }, rx).await?;
    Ok(Json(snapshot))
}

async fn session_action(
    State(state): State<RemoteState>,
    Json(payload): Json<ActionRequest>,
) -> Result<Json<RuntimeSnapshot>, RemoteError> {
    let (tx, rx) = oneshot::channel();
    let res = send_cmd(
        &state.tx,
        RemoteCmd::Action {
            action_id: payload.action_id,
            respond: tx,
        },
        rx,
    )
    .await?;
    res.map(Json)
}

async fn session_upload(
    State(state): State<RemoteState>,
    Json(payload): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, RemoteError> {
    let (tx, rx) = oneshot::channel();
    let res = send_cmd(
        &state.tx,
        RemoteCmd::Upload {
            file_names: payload.file_names,
            respond: tx,
        },
        rx,
    )
    .await?;
    Ok(Json(res))
}

async fn studio_update(
    State(state): State<RemoteState>,
    Json(settings): Json<StudioSettings>,
) -> Result<Json<RuntimeSnapshot>, RemoteError> {
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(
        &state.tx,
        RemoteCmd::SetStudio {
            settings,
            respond: tx,
        },
        rx,
    )
    .await?;
    Ok(Json(snapshot))
}

async fn notifications(
    State(state): State<RemoteState>,
) -> Result<Json<Vec<Notification>>, RemoteError> {
    let (tx, rx) = oneshot::channel();
    let recent = send_cmd(&state.tx, RemoteCmd::Notifications { respond: tx }, rx).await?;
    Ok(Json(recent))
}

pub fn router(
    tx: mpsc::UnboundedSender<RemoteCmd>,
    catalog: Arc<dyn Catalog + Send + Sync>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/manifest", get(manifest))
        .route("/api/catalog", get(list_catalog))
        .route("/api/session", get(session_state))
        .route("/api/session/select", post(session_select))
        .route("/api/session/action", post(session_action))
        .route("/api/session/upload", post(session_upload))
        .route("/api/studio", put(studio_update))
        .route("/api/notifications", get(notifications))
        .with_state(RemoteState { tx, catalog })
        .layer(cors)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteServerInfo {
    pub addr: SocketAddr,
}

pub struct RemoteServer {
    pub info: RemoteServerInfo,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RemoteServer {
    /// Binds on localhost and starts serving. Port 0 picks a free port.
    ///
    /// The returned receiver yields every command the HTTP handlers send; it closes once
    /// the server has stopped.
    pub async fn start(
        port: u16,
        catalog: Arc<dyn Catalog + Send + Sync>,
    ) -> io::Result<(Self, mpsc::UnboundedReceiver<RemoteCmd>)> {
        let (tx, rx) = mpsc::unbounded_channel::<RemoteCmd>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let info = RemoteServerInfo {
            addr: listener.local_addr()?,
        };

        let app = router(tx, catalog);
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = serve.await {
                log::error!("runtime api server error: {err}");
            }
        });

        Ok((
            Self {
                info,
                shutdown: Some(shutdown_tx),
                task,
            },
            rx,
        ))
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = self.task.await {
            log::warn!("runtime api server task ended abnormally: {err}");
        }
    }
}

/// Applies one remote command to the session and replies on its channel.
///
/// A dropped reply channel just means the HTTP caller went away.
pub fn handle_command<R: RandomSource>(
    session: &mut RuntimeSession<RecentSurface, R>,
    cmd: RemoteCmd,
) {
    match cmd {
        RemoteCmd::GetState { respond } => {
            let _ = respond.send(session.snapshot());
        }
        RemoteCmd::Select { game, respond } => {
            session.select_game(game);
            let _ = respond.send(session.snapshot());
        }
        RemoteCmd::Action { action_id, respond } => match action_from_id(&action_id) {
            Some(action) => {
                session.apply(action);
                let _ = respond.send(Ok(session.snapshot()));
            }
            None => {
                let _ = respond.send(Err(RemoteError::UnknownActionId(action_id)));
            }
        },
        RemoteCmd::Upload {
            file_names,
            respond,
        } => {
            let outcome = session.drop_files(&file_names);
            let archive = match outcome {
                DropOutcome::Accepted { archive } => Some(archive),
                DropOutcome::Rejected => None,
            };
            let _ = respond.send(UploadResponse {
                accepted: archive.is_some(),
                archive,
                snapshot: session.snapshot(),
            });
        }
        RemoteCmd::SetStudio { settings, respond } => {
            session.set_studio(settings);
            let _ = respond.send(session.snapshot());
        }
        RemoteCmd::Notifications { respond } => {
            let _ = respond.send(session.surface().recent());
        }
    }
}

/// Owns the session for its whole life: interleaves remote commands with clock frames.
///
/// Each frame moves the session clock by `frame_step`, never less than [`MIN_PERIOD`].
/// Frames the runtime could not service in time are skipped rather than replayed, so
/// session ticks can drift but never double up. Returns the torn-down session once
/// `shutdown` resolves or every command sender is gone.
pub async fn run_session<R, F>(
    mut session: RuntimeSession<RecentSurface, R>,
    mut rx: mpsc::UnboundedReceiver<RemoteCmd>,
    frame_step: Duration,
    shutdown: F,
) -> RuntimeSession<RecentSurface, R>
where
    R: RandomSource,
    F: Future<Output = ()>,
{
    let frame_step = frame_step.max(MIN_PERIOD);
    let mut frame = tokio::time::interval(frame_step);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frame.tick() => {
                session.advance(frame_step);
            }
            cmd = rx.recv() => match cmd {
                Some(cmd) => handle_command(&mut session, cmd),
                None => break,
            },
            _ = &mut shutdown => break,
        }
    }

    session.shutdown();
    session
}
