//! JSON API over HTTP.
//!
//! `POST /get-sitemap` with `{"url": "...", "refresh_cache": false}`.
//! Other methods on that path get 405. When both basic auth credentials are
//! configured every request must carry them.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tools::{GetSitemapOutput, GetSitemapParams, get_sitemap};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    let credentials = state
        .config
        .basic_auth()
        .map(|(user, pass)| Arc::new(Credentials::new(user, pass)));

    let mut router = Router::new()
        .route("/get-sitemap", post(get_sitemap_handler).fallback(method_not_allowed))
        .with_state(state);

    if let Some(credentials) = credentials {
        tracing::info!("basic authentication enabled");
        router = router.layer(middleware::from_fn_with_state(credentials, require_basic_auth));
    } else {
        tracing::info!("basic authentication disabled");
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Bind the configured address and serve until a shutdown signal arrives.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "starting sitescan HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn get_sitemap_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<GetSitemapOutput>, ApiError> {
    let params: GetSitemapParams = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("rejecting request body: {}", e);
        ApiError::InvalidJson
    })?;

    Ok(Json(get_sitemap(&state, params).await?))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Configured credentials, kept only as digests.
pub struct Credentials {
    user: [u8; 32],
    pass: [u8; 32],
}

impl Credentials {
    pub fn new(user: &str, pass: &str) -> Self {
        Self { user: Sha256::digest(user.as_bytes()).into(), pass: Sha256::digest(pass.as_bytes()).into() }
    }

    /// Constant-time comparison of both digests.
    pub fn matches(&self, user: &str, pass: &str) -> bool {
        let user: [u8; 32] = Sha256::digest(user.as_bytes()).into();
        let pass: [u8; 32] = Sha256::digest(pass.as_bytes()).into();

        let user_ok = self.user[..].ct_eq(&user[..]);
        let pass_ok = self.pass[..].ct_eq(&pass[..]);
        (user_ok & pass_ok).into()
    }
}

/// Decode an `Authorization: Basic ...` value into user and password.
pub fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

async fn require_basic_auth(State(credentials): State<Arc<Credentials>>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic)
        .is_some_and(|(user, pass)| credentials.matches(&user, &pass));

    if !authorized {
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received shutdown signal");
}
