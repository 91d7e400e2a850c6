use crate::auth::SessionKeys;
use crate::store::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_keys: SessionKeys,
    /// Whether the unauthenticated `/add-pizza` seeding route is live.
    pub seed_catalog: bool,
}
