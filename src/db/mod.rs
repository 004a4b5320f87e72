use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::note::{NewNote, Note, NoteChanges};
pub use repositories::user::{User, hash_password};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn note_repo(&self) -> repositories::note::NoteRepository {
        repositories::note::NoteRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(name, email, password, security).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_credentials(
        &self,
        email: &str,
        password: &str,
        fallback_hash: &str,
    ) -> Result<Option<User>> {
        self.user_repo()
            .verify_credentials(email, password, fallback_hash)
            .await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub async fn insert_note(&self, owner_id: i32, note: NewNote) -> Result<Note> {
        self.note_repo().insert(owner_id, note).await
    }

    pub async fn list_notes(&self, owner_id: i32) -> Result<Vec<Note>> {
        self.note_repo().list_by_owner(owner_id).await
    }

    pub async fn update_note_where(
        &self,
        id: i32,
        owner_id: i32,
        changes: NoteChanges,
    ) -> Result<Option<Note>> {
        self.note_repo().update_where(id, owner_id, changes).await
    }

    pub async fn delete_note_where(&self, id: i32, owner_id: i32) -> Result<bool> {
        self.note_repo().delete_where(id, owner_id).await
    }

    pub async fn count_notes(&self) -> Result<u64> {
        self.note_repo().count().await
    }
}
