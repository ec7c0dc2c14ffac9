//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, bootstrap admin, the rate limiter sweeper, the REST API and
//! graceful shutdown.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::ports::PasswordResetNotifier;
use crate::config::AppConfig;
use crate::infrastructure::crypto::TokenCodec;
use crate::infrastructure::database::{init_database, run_migrations};
use crate::infrastructure::notifier::LogNotifier;
use crate::infrastructure::rate_limit::RateLimiter;
use crate::interfaces::http::modules::metrics::install_prometheus;
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the bootstrap admin if no user exists (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    pub config: AppConfig,
    pub local_addr: std::net::SocketAddr,
    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting Folio API...");

        let prometheus = install_prometheus()?;

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database_config()).await?;
        if opts.auto_migrate {
            run_migrations(&db).await?;
        }

        // ── Services ───────────────────────────────────────────
        let jwt_config = app_cfg.jwt_config();
        info!(
            access_minutes = app_cfg.security.access_token_minutes,
            issuer = %jwt_config.issuer,
            "JWT configured"
        );
        let codec = TokenCodec::new(jwt_config);

        let limiter = RateLimiter::shared(app_cfg.rate_limit_config());
        let notifier: Arc<dyn PasswordResetNotifier> = Arc::new(LogNotifier);

        let state = AppState::new(
            db.clone(),
            codec,
            limiter.clone(),
            notifier,
            app_cfg.security.bcrypt_cost,
        );

        if opts.create_default_admin {
            create_default_admin(&state, &app_cfg).await;
        }

        // ── Background tasks ───────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();
        limiter.start_sweeper(shutdown_signal.clone());

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(state, Some(prometheus));
        let listener = tokio::net::TcpListener::bind(app_cfg.listen_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered, giving
    /// in-flight requests up to the configured timeout.
    pub async fn wait(self) {
        let timeout = std::time::Duration::from_secs(self.shutdown.timeout_secs());

        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(timeout_secs = timeout.as_secs(), "Shutdown timed out"),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Folio API shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Seed the configured admin when the user table is empty.
async fn create_default_admin(state: &AppState, app_cfg: &AppConfig) {
    match state
        .users
        .ensure_admin(&app_cfg.admin.email, &app_cfg.admin.password)
        .await
    {
        Ok(Some(admin)) => {
            info!(email = %admin.email, "Default admin created");
            warn!("Please change the default admin password");
        }
        Ok(None) => {}
        Err(e) => error!("Failed to create admin user: {}", e),
    }
}

/// Initialize tracing from the application config. Call once at startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
