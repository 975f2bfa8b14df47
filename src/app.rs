//! Application assembly: settings → pool → modules → router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_authz::{PasswordHasher, TokenService};
use bookshelf_db::DbModule;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules::{self, Services};

pub struct App {
    settings: Settings,
    pool: SqlitePool,
    registry: ModuleRegistry,
}

impl App {
    /// Validate settings, open the database and register every module.
    /// Fails before touching the database when no signing key is configured.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let tokens = Arc::new(TokenService::new(settings.auth.signing_key()?.as_bytes()));

        let pool = bookshelf_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(DbModule::new(pool.clone())));
        modules::register_all(
            &mut registry,
            &Services {
                pool: pool.clone(),
                tokens,
                passwords: Arc::new(PasswordHasher::new()),
                min_password_length: settings.auth.min_password_length,
            },
        );

        Ok(Self {
            settings,
            pool,
            registry,
        })
    }

    /// Apply pending migrations; returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        bookshelf_db::apply_migrations(&self.pool, &migrations)
            .await
            .context("failed to apply migrations")
    }

    /// Migrate, then initialize every module.
    pub async fn prepare(&self) -> anyhow::Result<()> {
        let applied = self.migrate().await?;
        tracing::info!(applied, "schema up to date");

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_all(&ctx).await
    }

    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    pub fn openapi(&self) -> serde_json::Value {
        bookshelf_http::router::openapi_document(&self.registry)
    }

    /// Run until a shutdown signal, then stop modules in reverse order.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.prepare().await?;

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(
            &self.registry,
            &self.settings,
            bookshelf_http::shutdown_signal(),
        )
        .await;

        let stopped = self.registry.stop_all().await;
        served.and(stopped)
    }
}
