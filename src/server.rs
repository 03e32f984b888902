//! Server runtime.
//!
//! [`ServerHandle`] encapsulates the full lifecycle: database connection,
//! migrations, REST API with Swagger UI, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::UserRepositoryInterface;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig, UserRepository};
use crate::interfaces::http::create_api_router;
use crate::interfaces::http::router::{DOCS_PATH, OPENAPI_PATH};
use crate::shared::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a running server.
///
/// ```rust,no_run
/// use stormforge::{AppConfig, ServerHandle};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(AppConfig::default()).await?;
///     handle.listen_for_os_signals();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Address the API is bound to (useful when the configured port is 0).
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Connect to the database, run migrations (if enabled) and start serving.
    pub async fn start(config: AppConfig) -> Result<Self, ServerError> {
        info!("Starting StormForge...");

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig::from(&config.database)).await?;

        if config.database.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repo: Arc<dyn UserRepositoryInterface> = Arc::new(UserRepository::new(db.clone()));

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(repo, &config);

        let listener = TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let api_task = tokio::spawn(async move {
            let result = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API server received shutdown signal");
            })
            .await;

            if let Err(e) = result {
                error!("REST API server error: {}", e);
            }
        });

        info!("REST API server listening on http://{}", local_addr);
        info!(
            "Users API at {}{}",
            config.server.public_url(),
            config.server.api_prefix
        );
        info!(
            "Swagger UI at {}{}/ (OpenAPI: {})",
            config.server.public_url(),
            DOCS_PATH,
            OPENAPI_PATH
        );

        Ok(Self {
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn listen_for_os_signals(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Wait until shutdown is triggered (or the server stops on its own),
    /// drain in-flight requests within the timeout, then close the database.
    pub async fn wait(mut self) {
        let signal = self.shutdown.signal();

        let finished = tokio::select! {
            _ = signal.wait() => false,
            _ = &mut self.api_task => true,
        };

        if !finished {
            info!(
                "Starting graceful shutdown (timeout: {}s)...",
                self.shutdown.timeout().as_secs()
            );
            let task = &mut self.api_task;
            let drained = self
                .shutdown
                .bounded(async move {
                    let _ = task.await;
                })
                .await;
            if !drained {
                self.api_task.abort();
            }
        } else {
            warn!("REST API server stopped without a shutdown signal");
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("StormForge shutdown complete");
    }

    /// Trigger shutdown and wait for it to complete.
    pub async fn shutdown(self) {
        self.shutdown.signal().trigger();
        self.wait().await;
    }
}
