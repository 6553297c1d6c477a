//! # Warden binary
//!
//! Assembles the control plane: configuration, repositories, the identity
//! layer, the moderation service, and the HTTP surface. Initialization
//! (including the optional bootstrap identity) completes before the
//! listener accepts traffic.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use api_adapters::{AppState, Metrics};
use auth_adapters::{AdmissionConfig, AdmissionController, Authenticator, TokenCodec};
use domains::{AdminUser, CommentRepo, DomainError, IdentityRepo, PostRepo};
use services::ModerationService;

/// How often idle admission records are reclaimed.
const ADMISSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = configs::load().context("loading configuration")?;

    let (identities, posts, comments) = build_repos(&config).await?;

    if let Some(bootstrap) = &config.bootstrap {
        let admin = AdminUser {
            id: uuid::Uuid::new_v4(),
            username: bootstrap.username.clone(),
            password_hash: bootstrap.password_hash.clone(),
            is_active: true,
            created_at: chrono::Utc::now(),
            last_login: None,
        };
        match identities.insert(admin).await {
            Ok(()) => info!(username = %bootstrap.username, "bootstrap admin provisioned"),
            Err(DomainError::Conflict(_)) => {
                debug!(username = %bootstrap.username, "bootstrap admin already present");
            }
            Err(err) => return Err(err).context("provisioning bootstrap admin"),
        }
    }

    let codec = TokenCodec::new(&config.auth.secret_key);
    let authenticator = Arc::new(Authenticator::new(
        identities,
        codec,
        chrono::Duration::minutes(config.auth.token_ttl_minutes),
    )?);

    let admission = Arc::new(AdmissionController::new(AdmissionConfig {
        ceiling: config.admission.login_attempts_per_minute,
        window: Duration::from_secs(config.admission.window_seconds),
        trusted_keys: config.admission.trusted_keys.iter().cloned().collect(),
    }));
    let sweeper = admission.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(ADMISSION_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            sweeper.sweep();
        }
    });

    let state = AppState {
        authenticator,
        moderation: Arc::new(ModerationService::new(posts, comments)),
        admission,
        metrics: Arc::new(Metrics::new()),
        trust_proxy_headers: config.server.trust_proxy_headers,
    };

    let app = api_adapters::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins)?);

    let addr: SocketAddr = config.server.bind.parse().context("parsing server.bind")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "warden listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn build_repos(
    config: &configs::AppConfig,
) -> anyhow::Result<(
    Arc<dyn IdentityRepo>,
    Arc<dyn PostRepo>,
    Arc<dyn CommentRepo>,
)> {
    use secrecy::ExposeSecret;
    use storage_adapters::postgres::{PgCommentRepo, PgIdentityRepo, PgPostRepo};

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database.url.expose_secret())
        .await
        .context("connecting to postgres")?;
    info!("using postgres storage");
    Ok((
        Arc::new(PgIdentityRepo::new(pool.clone())),
        Arc::new(PgPostRepo::new(pool.clone())),
        Arc::new(PgCommentRepo::new(pool)),
    ))
}

#[cfg(not(feature = "db-postgres"))]
async fn build_repos(
    _config: &configs::AppConfig,
) -> anyhow::Result<(
    Arc<dyn IdentityRepo>,
    Arc<dyn PostRepo>,
    Arc<dyn CommentRepo>,
)> {
    use storage_adapters::memory::{MemoryCommentRepo, MemoryIdentityRepo, MemoryPostRepo};

    info!("using in-memory storage; content does not survive restarts");
    Ok((
        Arc::new(MemoryIdentityRepo::new()),
        Arc::new(MemoryPostRepo::new()),
        Arc::new(MemoryCommentRepo::new()),
    ))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::new());
    }
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("parsing cors origin")?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
