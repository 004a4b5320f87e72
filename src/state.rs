use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, NoteService, SeaOrmAuthService, SeaOrmNoteService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub note_service: Arc<dyn NoteService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )?) as Arc<dyn AuthService>;

        let note_service = Arc::new(SeaOrmNoteService::new(store.clone())) as Arc<dyn NoteService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            note_service,
        })
    }
}
