//! HTTP gateway in front of the tikwm API
//!
//! Exposes the three upstream operations under a configurable prefix and
//! answers with the decoded payload as JSON:
//!
//! | Route                    | Operation                      |
//! |--------------------------|--------------------------------|
//! | `{prefix}/`              | post by `url` (`hd=1` for HD)  |
//! | `{prefix}/user/posts`    | one feed page                  |
//! | `{prefix}/user/info`     | user profile                   |
//!
//! Any failure is answered with `400` and `{"code": 400, "msg": "..."}`.
//! All routes share one [`TikwmClient`], so its throttle spans every
//! request the gateway serves.

use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tikwm_api_client::pagination::INITIAL_CURSOR;
use tikwm_api_client::{ApiError, FeedPage, Post, TikwmClient, UserProfile};
use tikwm_telemetry::Timer;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Default route prefix
pub const DEFAULT_PREFIX: &str = "/v1/tikwm";

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:42011";

/// Body of every non-200 answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
}

/// Failure of a gateway request
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = ErrorBody {
            code: status.as_u16(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Query of the post route
#[derive(Debug, Default, Deserialize)]
pub struct PostParams {
    pub url: Option<String>,
    pub hd: Option<String>,
}

/// Query of the feed route
#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub unique_id: Option<String>,
    pub user_id: Option<String>,
    pub count: Option<String>,
    pub cursor: Option<String>,
}

/// Query of the profile route
#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    pub unique_id: Option<String>,
}

#[derive(Clone)]
struct AppState {
    client: TikwmClient,
}

/// Build the gateway router
///
/// A trailing `/` on `prefix` is ignored.
pub fn app(client: TikwmClient, prefix: &str) -> Router {
    let prefix = prefix.trim_end_matches('/');

    Router::new()
        .route(&format!("{prefix}/"), any(post))
        .route(&format!("{prefix}/user/posts"), any(feed_page))
        .route(&format!("{prefix}/user/info"), any(profile))
        .layer(middleware::from_fn(log_requests))
        .with_state(AppState { client })
}

/// Serve `app` on `listener` until Ctrl-C
pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Normalize a listen address; a bare `:port` binds every interface
pub fn listen_addr(listen: &str) -> String {
    if listen.starts_with(':') {
        format!("0.0.0.0{listen}")
    } else {
        listen.to_string()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let timer = Timer::start("gateway_request");

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = timer.stop().as_millis();
    if status.is_success() {
        info!(%method, %path, status = status.as_u16(), duration_ms, "Request served");
    } else {
        warn!(%method, %path, status = status.as_u16(), duration_ms, "Request failed");
    }
    response
}

fn required(value: Option<String>, name: &'static str) -> Result<String, GatewayError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::MissingParam(name))
}

async fn post(
    State(state): State<AppState>,
    Query(params): Query<PostParams>,
) -> Result<Json<Post>, GatewayError> {
    let url = required(params.url, "url")?;
    let hd = params.hd.as_deref() == Some("1");
    Ok(Json(state.client.posts().fetch(&url, hd).await?))
}

async fn feed_page(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, GatewayError> {
    let user = required(params.unique_id.or(params.user_id), "unique_id")?;
    let count = params
        .count
        .and_then(|c| c.parse::<u32>().ok())
        .filter(|c| *c > 0)
        .unwrap_or(state.client.config().feed_page_size);
    let cursor = params
        .cursor
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| INITIAL_CURSOR.to_string());

    Ok(Json(state.client.users().feed_page(&user, count, &cursor).await?))
}

async fn profile(
    State(state): State<AppState>,
    Query(params): Query<ProfileParams>,
) -> Result<Json<UserProfile>, GatewayError> {
    let unique_id = required(params.unique_id, "unique_id")?;
    Ok(Json(state.client.users().profile(&unique_id).await?))
}
