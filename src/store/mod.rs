//! Persistence seams. The engine never talks to storage directly; the
//! orchestrator loads a session, mutates a copy and writes it back through
//! [`GameStore::save`], which only succeeds if nobody else wrote in between.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{GameSession, WordPack};

pub use memory::{MemoryGameStore, MemoryWordPackStore};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored session moved past the version the caller loaded
    #[error("session was modified concurrently (expected version {expected})")]
    VersionConflict { expected: i64 },
    #[error("room code {0} is already in use")]
    DuplicateCode(String),
    #[error("session {0} does not exist")]
    Missing(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt session record: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert(&self, session: &GameSession) -> Result<(), StoreError>;

    async fn load(&self, id: Uuid) -> Result<Option<GameSession>, StoreError>;

    /// Look up a room by its (normalized) join code
    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, StoreError>;

    /// Persist `session` only if the stored copy is still at `expected_version`.
    async fn save(&self, session: &GameSession, expected_version: i64) -> Result<(), StoreError>;

    /// Public rooms that have not started yet, newest first
    async fn list_public_waiting(&self, limit: usize) -> Result<Vec<GameSession>, StoreError>;

    /// Delete every session [`GameSession::is_abandoned`] at these cutoffs,
    /// releasing its room code. Returns how many were removed.
    async fn evict_abandoned(
        &self,
        empty_before: DateTime<Utc>,
        finished_before: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait WordPackStore: Send + Sync {
    /// Public packs and the default pack, default first
    async fn list(&self) -> Result<Vec<WordPack>, StoreError>;

    /// Any pack by id, private ones included
    async fn get(&self, pack_id: Uuid) -> Result<Option<WordPack>, StoreError>;

    /// Candidate words for a pack, `None` if the pack does not exist
    async fn words(&self, pack_id: Uuid) -> Result<Option<Vec<String>>, StoreError>;

    async fn create(&self, pack: &WordPack, words: &[String]) -> Result<(), StoreError>;

    /// Overwrite a pack's metadata. `false` if there is no such pack.
    async fn update(&self, pack: &WordPack) -> Result<bool, StoreError>;

    /// Add words the pack does not hold yet. Returns how many were new, or
    /// `None` if there is no such pack.
    async fn add_words(
        &self,
        pack_id: Uuid,
        words: &[String],
    ) -> Result<Option<usize>, StoreError>;

    /// `false` if the pack did not contain the word
    async fn delete_word(&self, pack_id: Uuid, word: &str) -> Result<bool, StoreError>;

    /// Remove a pack and its words. `false` if there is no such pack.
    async fn delete(&self, pack_id: Uuid) -> Result<bool, StoreError>;

    async fn default_pack(&self) -> Result<Option<WordPack>, StoreError> {
        Ok(self.list().await?.into_iter().find(|p| p.is_default))
    }
}
