//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::database::Database;

/// Collaborators a request handler may use. Cloned per request; the
/// collaborators themselves are shared.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }
}
