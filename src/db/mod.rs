use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    models::{GameSession, WordPack},
    store::{GameStore, StoreError, WordPackStore},
};

pub mod queries;

pub async fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Postgres-backed [`GameStore`] and [`WordPackStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seed the default pack on first boot so rooms can be created right away
    pub async fn ensure_default_pack(&self, name: &str, words: &[String]) -> Result<(), StoreError> {
        if self.default_pack().await?.is_some() {
            return Ok(());
        }

        let pack = WordPack::default_pack(name, "en");
        queries::create_word_pack(&self.pool, &pack, words).await?;
        tracing::info!("Seeded default word pack '{}' with {} words", name, words.len());
        Ok(())
    }

    fn decode(row: queries::GameSessionRow) -> Result<GameSession, StoreError> {
        let mut session: GameSession = serde_json::from_value(row.snapshot)?;
        // The column is authoritative for the CAS
        session.version = row.version;
        Ok(session)
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn insert(&self, session: &GameSession) -> Result<(), StoreError> {
        let snapshot = serde_json::to_value(session)?;
        queries::insert_session(&self.pool, session, snapshot)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::DuplicateCode(session.code.clone())
                }
                other => StoreError::Database(other),
            })
    }

    async fn load(&self, id: Uuid) -> Result<Option<GameSession>, StoreError> {
        queries::get_session(&self.pool, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, StoreError> {
        queries::get_session_by_code(&self.pool, code)
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn save(&self, session: &GameSession, expected_version: i64) -> Result<(), StoreError> {
        let snapshot = serde_json::to_value(session)?;
        let updated =
            queries::update_session_if_version(&self.pool, session, snapshot, expected_version)
                .await?;

        if updated == 0 {
            if !queries::session_exists(&self.pool, session.id).await? {
                return Err(StoreError::Missing(session.id));
            }
            tracing::debug!(
                "Conditional update lost for game {} (expected version {})",
                session.id,
                expected_version
            );
            return Err(StoreError::VersionConflict {
                expected: expected_version,
            });
        }

        Ok(())
    }

    async fn list_public_waiting(&self, limit: usize) -> Result<Vec<GameSession>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        queries::list_public_waiting_sessions(&self.pool, limit)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn evict_abandoned(
        &self,
        empty_before: DateTime<Utc>,
        finished_before: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let deleted =
            queries::delete_abandoned_sessions(&self.pool, empty_before, finished_before).await?;
        Ok(usize::try_from(deleted).unwrap_or(usize::MAX))
    }
}

#[async_trait]
impl WordPackStore for PgStore {
    async fn list(&self) -> Result<Vec<WordPack>, StoreError> {
        Ok(queries::list_word_packs(&self.pool).await?)
    }

    async fn get(&self, pack_id: Uuid) -> Result<Option<WordPack>, StoreError> {
        Ok(queries::get_word_pack(&self.pool, pack_id).await?)
    }

    async fn words(&self, pack_id: Uuid) -> Result<Option<Vec<String>>, StoreError> {
        if !queries::word_pack_exists(&self.pool, pack_id).await? {
            return Ok(None);
        }
        Ok(Some(queries::get_pack_words(&self.pool, pack_id).await?))
    }

    async fn create(&self, pack: &WordPack, words: &[String]) -> Result<(), StoreError> {
        Ok(queries::create_word_pack(&self.pool, pack, words).await?)
    }

    async fn update(&self, pack: &WordPack) -> Result<bool, StoreError> {
        Ok(queries::update_word_pack(&self.pool, pack).await? > 0)
    }

    async fn add_words(
        &self,
        pack_id: Uuid,
        words: &[String],
    ) -> Result<Option<usize>, StoreError> {
        if !queries::word_pack_exists(&self.pool, pack_id).await? {
            return Ok(None);
        }
        let added = queries::add_words(&self.pool, pack_id, words).await?;
        Ok(Some(usize::try_from(added).unwrap_or(usize::MAX)))
    }

    async fn delete_word(&self, pack_id: Uuid, word: &str) -> Result<bool, StoreError> {
        Ok(queries::delete_word(&self.pool, pack_id, word).await? > 0)
    }

    async fn delete(&self, pack_id: Uuid) -> Result<bool, StoreError> {
        Ok(queries::delete_word_pack(&self.pool, pack_id).await? > 0)
    }
}
