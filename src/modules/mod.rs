pub mod auth;
pub mod books;

use std::sync::Arc;

use bookshelf_authz::{PasswordHasher, TokenService};
use bookshelf_kernel::ModuleRegistry;
use sqlx::SqlitePool;

/// Shared services handed to every application module.
#[derive(Clone)]
pub struct Services {
    pub pool: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordHasher>,
    pub min_password_length: usize,
}

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) {
    registry.register_custom(auth::create_module(auth::routes::AuthState {
        store: auth::store::CredentialStore::new(services.pool.clone()),
        passwords: Arc::clone(&services.passwords),
        tokens: Arc::clone(&services.tokens),
        min_password_length: services.min_password_length,
    }));
    registry.register_custom(books::create_module(
        services.pool.clone(),
        Arc::clone(&services.tokens),
    ));
}
