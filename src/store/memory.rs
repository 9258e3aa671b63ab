use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{GameStore, StoreError, WordPackStore};
use crate::models::{GameSession, GameStatus, WordPack};

/// In-process session store. Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    sessions: DashMap<Uuid, GameSession>,
    /// room code -> session id
    codes: DashMap<String, Uuid>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn insert(&self, session: &GameSession) -> Result<(), StoreError> {
        match self.codes.entry(session.code.clone()) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateCode(session.code.clone())),
            Entry::Vacant(slot) => {
                slot.insert(session.id);
            }
        }
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<GameSession>, StoreError> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, StoreError> {
        let Some(id) = self.codes.get(code).map(|id| *id) else {
            return Ok(None);
        };
        self.load(id).await
    }

    async fn save(&self, session: &GameSession, expected_version: i64) -> Result<(), StoreError> {
        // The shard lock held by get_mut makes the compare and the write atomic
        let mut stored = self
            .sessions
            .get_mut(&session.id)
            .ok_or(StoreError::Missing(session.id))?;

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
            });
        }

        *stored = session.clone();
        Ok(())
    }

    async fn list_public_waiting(&self, limit: usize) -> Result<Vec<GameSession>, StoreError> {
        let mut rooms: Vec<GameSession> = self
            .sessions
            .iter()
            .filter(|s| s.is_public && s.status == GameStatus::Waiting)
            .map(|s| s.clone())
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rooms.truncate(limit);
        Ok(rooms)
    }

    async fn evict_abandoned(
        &self,
        empty_before: DateTime<Utc>,
        finished_before: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let candidates: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|s| s.is_abandoned(empty_before, finished_before))
            .map(|s| s.id)
            .collect();

        let mut evicted = 0;
        for id in candidates {
            // Re-checked under the shard lock in case someone joined meanwhile
            let removed = self
                .sessions
                .remove_if(&id, |_, s| s.is_abandoned(empty_before, finished_before));
            if let Some((_, session)) = removed {
                self.codes.remove_if(&session.code, |_, owner| *owner == id);
                evicted += 1;
            }
        }
        Ok(evicted)
    }
}

/// Word packs held in memory, typically the default list loaded at startup
#[derive(Debug, Default)]
pub struct MemoryWordPackStore {
    packs: DashMap<Uuid, (WordPack, Vec<String>)>,
}

impl MemoryWordPackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pack(pack: WordPack, words: Vec<String>) -> Self {
        let store = Self::new();
        store.add_pack(pack, words);
        store
    }

    pub fn add_pack(&self, pack: WordPack, words: Vec<String>) {
        self.packs.insert(pack.pack_id, (pack, words));
    }
}

#[async_trait]
impl WordPackStore for MemoryWordPackStore {
    async fn list(&self) -> Result<Vec<WordPack>, StoreError> {
        let mut packs: Vec<WordPack> = self
            .packs
            .iter()
            .filter(|e| e.0.is_public || e.0.is_default)
            .map(|e| e.0.clone())
            .collect();
        packs.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(packs)
    }

    async fn get(&self, pack_id: Uuid) -> Result<Option<WordPack>, StoreError> {
        Ok(self.packs.get(&pack_id).map(|e| e.0.clone()))
    }

    async fn words(&self, pack_id: Uuid) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.packs.get(&pack_id).map(|e| e.1.clone()))
    }

    async fn create(&self, pack: &WordPack, words: &[String]) -> Result<(), StoreError> {
        let mut unique: Vec<String> = Vec::with_capacity(words.len());
        for word in words {
            if !unique.contains(word) {
                unique.push(word.clone());
            }
        }
        self.add_pack(pack.clone(), unique);
        Ok(())
    }

    async fn update(&self, pack: &WordPack) -> Result<bool, StoreError> {
        let Some(mut entry) = self.packs.get_mut(&pack.pack_id) else {
            return Ok(false);
        };
        entry.0 = pack.clone();
        Ok(true)
    }

    async fn add_words(
        &self,
        pack_id: Uuid,
        words: &[String],
    ) -> Result<Option<usize>, StoreError> {
        let Some(mut entry) = self.packs.get_mut(&pack_id) else {
            return Ok(None);
        };
        let stored = &mut entry.1;
        let before = stored.len();
        for word in words {
            if !stored.contains(word) {
                stored.push(word.clone());
            }
        }
        Ok(Some(stored.len() - before))
    }

    async fn delete_word(&self, pack_id: Uuid, word: &str) -> Result<bool, StoreError> {
        let Some(mut entry) = self.packs.get_mut(&pack_id) else {
            return Ok(false);
        };
        let stored = &mut entry.1;
        let before = stored.len();
        stored.retain(|w| w != word);
        Ok(stored.len() < before)
    }

    async fn delete(&self, pack_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.packs.remove(&pack_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Player;

    fn session(code: &str) -> GameSession {
        GameSession::new(code.to_string(), "Room".to_string(), Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_insert_and_find_by_code() {
        let store = MemoryGameStore::new();
        let s = session("ABCDEF");
        store.insert(&s).await.unwrap();

        let found = store.find_by_code("ABCDEF").await.unwrap().unwrap();
        assert_eq!(found.id, s.id);
        assert!(store.find_by_code("ZZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let store = MemoryGameStore::new();
        store.insert(&session("ABCDEF")).await.unwrap();
        let err = store.insert(&session("ABCDEF")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCode(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_save_is_conditional_on_version() {
        let store = MemoryGameStore::new();
        let mut s = session("ABCDEF");
        store.insert(&s).await.unwrap();

        s.version = 1;
        s.name = "first".into();
        store.save(&s, 0).await.unwrap();

        // A writer that loaded version 0 loses
        let mut stale = s.clone();
        stale.version = 1;
        stale.name = "second".into();
        let err = store.save(&stale, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0 }));

        let stored = store.load(s.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "first");
    }

    #[tokio::test]
    async fn test_save_missing_session() {
        let store = MemoryGameStore::new();
        let err = store.save(&session("ABCDEF"), 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn test_evicting_emptied_rooms_frees_codes() {
        let store = MemoryGameStore::new();
        for i in 0..50 {
            store.insert(&session(&format!("ROOM{:02}", i))).await.unwrap();
        }
        let mut occupied = session("KEEP22");
        occupied.players.push(Player::new("alice", true));
        store.insert(&occupied).await.unwrap();

        let now = Utc::now();
        let evicted = store.evict_abandoned(now, now).await.unwrap();
        assert_eq!(evicted, 50);
        assert_eq!(store.len(), 1);
        assert!(store.find_by_code("ROOM00").await.unwrap().is_none());
        assert!(store.find_by_code("KEEP22").await.unwrap().is_some());

        // A freed code can be handed out again
        store.insert(&session("ROOM00")).await.unwrap();
    }

    #[tokio::test]
    async fn test_recently_emptied_room_survives_grace_period() {
        let store = MemoryGameStore::new();
        store.insert(&session("ABCDEF")).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::minutes(2);
        assert_eq!(store.evict_abandoned(cutoff, cutoff).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_public_waiting_rooms_newest_first() {
        let store = MemoryGameStore::new();
        let base = Utc::now();
        for (i, code) in ["AAAAAA", "BBBBBB", "CCCCCC", "DDDDDD"].iter().enumerate() {
            let mut s = session(code);
            s.is_public = *code != "BBBBBB";
            s.created_at = base + chrono::Duration::seconds(i as i64);
            if *code == "DDDDDD" {
                s.status = GameStatus::Playing;
            }
            store.insert(&s).await.unwrap();
        }

        let codes: Vec<String> = store
            .list_public_waiting(20)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(codes, vec!["CCCCCC", "AAAAAA"]);
        assert_eq!(store.list_public_waiting(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_word_pack_editing() {
        let store = MemoryWordPackStore::new();
        let mut pack = WordPack::new("Animals", None, false, "en");
        store
            .create(&pack, &["LION".into(), "LION".into(), "TIGER".into()])
            .await
            .unwrap();
        assert_eq!(store.words(pack.pack_id).await.unwrap().unwrap().len(), 2);

        // Private packs stay out of the listing but can be fetched by id
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.get(pack.pack_id).await.unwrap().is_some());

        pack.is_public = true;
        assert!(store.update(&pack).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);

        let added = store
            .add_words(pack.pack_id, &["TIGER".into(), "BEAR".into()])
            .await
            .unwrap();
        assert_eq!(added, Some(1));
        assert!(store.delete_word(pack.pack_id, "LION").await.unwrap());
        assert!(!store.delete_word(pack.pack_id, "LION").await.unwrap());
        assert_eq!(
            store.words(pack.pack_id).await.unwrap().unwrap(),
            vec!["TIGER".to_string(), "BEAR".to_string()]
        );

        assert!(store.delete(pack.pack_id).await.unwrap());
        assert!(store.get(pack.pack_id).await.unwrap().is_none());
        assert_eq!(store.add_words(pack.pack_id, &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_word_pack_store() {
        let pack = WordPack::default_pack("Default", "en");
        let id = pack.pack_id;
        let store = MemoryWordPackStore::with_pack(pack, vec!["APPLE".into()]);

        assert_eq!(store.words(id).await.unwrap(), Some(vec!["APPLE".to_string()]));
        assert!(store.words(Uuid::new_v4()).await.unwrap().is_none());
        assert_eq!(store.default_pack().await.unwrap().unwrap().pack_id, id);
    }
}
