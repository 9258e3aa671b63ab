//! Game orchestration: the external contract of the engine.
//!
//! Every mutating call follows the same path: take the session's lock, load
//! it, apply one engine operation to the loaded copy, bump the version,
//! write it back conditionally on the version that was loaded, then publish
//! what changed. A failed operation never reaches the store.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    broadcast::{Broadcaster, EventEnvelope, GameEvent},
    error::ServiceError,
    game::{
        room::MAX_PLAYERS, CardView, GameError, RevealOutcome, RoomModel, RoomSummary,
        SessionView, TurnEngine,
    },
    models::{
        GameSession, GameStatus, Hint, Player, PlayerTeam, Role, Team, WordPack, WordPackChanges,
        WordPackDetail,
    },
    oracle::{HintOracle, OracleRequest},
    store::{GameStore, StoreError, WordPackStore},
    utils::codes::{generate_room_code, normalize_room_code},
};

/// Attempts at finding an unused room code before giving up
const ROOM_CODE_ATTEMPTS: usize = 5;

/// Most rooms the public room browser shows at once
pub const PUBLIC_ROOM_LIMIT: usize = 20;

/// Longest word a pack may hold
const MAX_WORD_LENGTH: usize = 64;

/// One async mutex per session so concurrent requests for the same room
/// apply one at a time
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub async fn acquire(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(session_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Forget locks that nobody holds or waits on
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }
}

/// Marks an oracle call in flight for one session turn; cleared on drop
struct PendingHint<'a> {
    pending: &'a DashMap<(Uuid, u32), ()>,
    key: (Uuid, u32),
}

impl Drop for PendingHint<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

pub struct GameService {
    store: Arc<dyn GameStore>,
    word_packs: Arc<dyn WordPackStore>,
    broadcaster: Arc<dyn Broadcaster>,
    oracle: Arc<dyn HintOracle>,
    locks: SessionLocks,
    pending_hints: DashMap<(Uuid, u32), ()>,
    max_players: usize,
}

impl GameService {
    pub fn new(
        store: Arc<dyn GameStore>,
        word_packs: Arc<dyn WordPackStore>,
        broadcaster: Arc<dyn Broadcaster>,
        oracle: Arc<dyn HintOracle>,
    ) -> Self {
        Self {
            store,
            word_packs,
            broadcaster,
            oracle,
            locks: SessionLocks::default(),
            pending_hints: DashMap::new(),
            max_players: MAX_PLAYERS,
        }
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    /// Open a new room with `nickname` as its host. Public rooms show up in
    /// [`GameService::list_public_rooms`] until the game starts.
    pub async fn create_room(
        &self,
        name: &str,
        nickname: &str,
        word_pack_id: Option<Uuid>,
        is_public: bool,
    ) -> Result<(GameSession, Player), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::BadRequest("room name must not be empty"));
        }
        let nickname = Self::check_nickname(nickname)?;

        let pack_id = match word_pack_id {
            Some(id) => {
                self.word_packs
                    .words(id)
                    .await?
                    .ok_or(ServiceError::WordPackNotFound)?;
                id
            }
            None => {
                self.word_packs
                    .default_pack()
                    .await?
                    .ok_or(ServiceError::WordPackNotFound)?
                    .pack_id
            }
        };

        for _ in 0..ROOM_CODE_ATTEMPTS {
            let mut session = GameSession::new(generate_room_code(), name.to_string(), pack_id);
            session.is_public = is_public;
            let host = RoomModel::join(&mut session, nickname, self.max_players)?;

            match self.store.insert(&session).await {
                Ok(()) => {
                    tracing::info!(
                        "Room {} ({}) created by {} ({})",
                        session.code,
                        session.id,
                        host.nickname,
                        host.id
                    );
                    return Ok((session, host));
                }
                Err(StoreError::DuplicateCode(code)) => {
                    tracing::debug!("Room code {} collided, retrying", code);
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            "Could not find a free room code after {} attempts",
            ROOM_CODE_ATTEMPTS
        );
        Err(ServiceError::BadRequest("could not allocate a room code, try again"))
    }

    /// Join a room by its code. A caller that already has a seat (known
    /// `player_id`) keeps it and only updates the nickname.
    pub async fn join_room(
        &self,
        code: &str,
        nickname: &str,
        player_id: Option<Uuid>,
    ) -> Result<(GameSession, Player), ServiceError> {
        let code = normalize_room_code(code);
        let nickname = Self::check_nickname(nickname)?;
        let session_id = self
            .store
            .find_by_code(&code)
            .await?
            .ok_or_else(|| ServiceError::RoomNotFound(code.clone()))?
            .id;

        let max_players = self.max_players;
        let (session, (player, rejoined)) = self
            .mutate(session_id, |session| {
                if let Some(existing) = player_id.and_then(|id| session.player_mut(id)) {
                    existing.nickname = nickname.to_string();
                    return Ok((existing.clone(), true));
                }
                Ok((RoomModel::join(session, nickname, max_players)?, false))
            })
            .await?;

        if rejoined {
            tracing::info!("Player {} ({}) rejoined room {}", player.nickname, player.id, code);
            self.publish(&session, GameEvent::PlayerUpdated { player: player.clone() })
                .await;
        } else {
            tracing::info!("Player {} ({}) joined room {}", player.nickname, player.id, code);
            self.publish(&session, GameEvent::PlayerJoined { player: player.clone() })
                .await;
        }

        Ok((session, player))
    }

    /// Seat `target_id` on a team with a role. Players may move themselves;
    /// the host may move anyone.
    pub async fn set_team_and_role(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        target_id: Uuid,
        team: PlayerTeam,
        role: Option<Role>,
    ) -> Result<Player, ServiceError> {
        let (session, player) = self
            .mutate(session_id, |session| {
                Self::ensure_self_or_host(session, actor_id, target_id)?;
                Ok(RoomModel::set_team_and_role(session, target_id, team, role)?)
            })
            .await?;

        tracing::info!(
            "Player {} in game {} is now {:?}/{:?}",
            player.id,
            session_id,
            player.team,
            player.role
        );
        self.publish(&session, GameEvent::PlayerUpdated { player: player.clone() })
            .await;
        Ok(player)
    }

    pub async fn add_automated_codegiver(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        team: Team,
    ) -> Result<Player, ServiceError> {
        let max_players = self.max_players;
        let (session, player) = self
            .mutate(session_id, |session| {
                Self::ensure_host(session, actor_id)?;
                Ok(RoomModel::add_automated_codegiver(session, team, max_players)?)
            })
            .await?;

        tracing::info!(
            "Automated codegiver {} seated for {} in game {}",
            player.id,
            team,
            session_id
        );
        self.publish(&session, GameEvent::PlayerJoined { player: player.clone() })
            .await;
        Ok(player)
    }

    /// Leave the room, or (host only) remove someone else
    pub async fn remove_player(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<Player, ServiceError> {
        let (session, removed) = self
            .mutate(session_id, |session| {
                Self::ensure_self_or_host(session, actor_id, target_id)?;
                Ok(RoomModel::remove_player(session, target_id)?)
            })
            .await?;

        tracing::info!("Player {} removed from game {}", removed.id, session_id);
        self.publish(&session, GameEvent::PlayerLeft { player_id: removed.id })
            .await;

        if removed.is_host {
            if let Some(host) = session.players.iter().find(|p| p.is_host) {
                self.publish(&session, GameEvent::PlayerUpdated { player: host.clone() })
                    .await;
            }
        }
        Ok(removed)
    }

    /// Deal the board. Only the host may start, and only once both teams
    /// are staffed.
    pub async fn start_game(&self, session_id: Uuid, actor_id: Uuid) -> Result<(), ServiceError> {
        let pack_id = self.load(session_id).await?.word_pack_id;
        let words = self
            .word_packs
            .words(pack_id)
            .await?
            .ok_or(ServiceError::WordPackNotFound)?;

        let (session, ()) = self
            .mutate(session_id, |session| {
                if session.status == GameStatus::Waiting {
                    Self::ensure_host(session, actor_id)?;
                    RoomModel::readiness(session)?;
                }
                Ok(TurnEngine::start_game(session, actor_id, &words, &mut rand::rng())?)
            })
            .await?;

        let current_turn = session.current_turn.unwrap_or(Team::Red);
        tracing::info!("Game {} started, {} moves first", session_id, current_turn);
        self.publish(
            &session,
            GameEvent::GameStarted {
                current_turn,
                cards: session.cards.iter().map(CardView::masked).collect(),
            },
        )
        .await;
        Ok(())
    }

    pub async fn give_hint(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        word: &str,
        count: i32,
    ) -> Result<Hint, ServiceError> {
        let (session, hint) = self
            .mutate(session_id, |session| {
                Ok(TurnEngine::give_hint(session, actor_id, word, count)?)
            })
            .await?;

        tracing::info!(
            "Hint '{}' ({}) given for {} in game {}",
            hint.word,
            hint.count,
            hint.team,
            session_id
        );
        self.publish(&session, GameEvent::HintGiven { hint: hint.clone() })
            .await;
        Ok(hint)
    }

    pub async fn reveal_card(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        card_id: Uuid,
    ) -> Result<RevealOutcome, ServiceError> {
        let (session, outcome) = self
            .mutate(session_id, |session| {
                Ok(TurnEngine::reveal_card(session, card_id, actor_id)?)
            })
            .await?;

        tracing::info!(
            "Card '{}' ({:?}) revealed by {} in game {}",
            outcome.card.word,
            outcome.card.card_type,
            actor_id,
            session_id
        );
        self.publish(
            &session,
            GameEvent::CardRevealed {
                card: outcome.card.clone(),
                next_turn: outcome.next_turn,
                winner: outcome.winner,
            },
        )
        .await;

        if let Some(winner) = outcome.winner {
            tracing::info!("Game {} over, {} wins", session_id, winner);
            self.publish(&session, GameEvent::GameOver { winner }).await;
        } else if let (true, Some(turn)) = (outcome.turn_changed, outcome.next_turn) {
            self.publish(
                &session,
                GameEvent::TurnChanged {
                    turn,
                    turn_number: session.turn_number,
                },
            )
            .await;
        }

        Ok(outcome)
    }

    /// End the caller's team's turn
    pub async fn pass_turn(&self, session_id: Uuid, actor_id: Uuid) -> Result<Team, ServiceError> {
        let (session, next) = self
            .mutate(session_id, |session| {
                let team = session
                    .player(actor_id)
                    .ok_or(GameError::PlayerNotFound)?
                    .team
                    .team()
                    .ok_or(GameError::Spectator)?;
                Ok(TurnEngine::pass_turn(session, team)?)
            })
            .await?;

        tracing::info!("Turn passed to {} in game {}", next, session_id);
        self.publish(
            &session,
            GameEvent::TurnChanged {
                turn: next,
                turn_number: session.turn_number,
            },
        )
        .await;
        Ok(next)
    }

    /// Ask the oracle for a clue on behalf of the active team's automated
    /// codegiver. The oracle runs outside the session lock; the resulting
    /// hint only lands if the turn has not moved on in the meantime.
    pub async fn request_automated_hint(
        &self,
        session_id: Uuid,
        requested_by: Uuid,
    ) -> Result<Hint, ServiceError> {
        let session = self.load(session_id).await?;
        let requester = session
            .player(requested_by)
            .ok_or(GameError::PlayerNotFound)?;
        let (team, codegiver_id) = Self::automated_turn(&session)?;
        // Only the team the clue is for may ask for it
        match requester.team.team() {
            None => return Err(GameError::Spectator.into()),
            Some(own) if own != team => return Err(GameError::NotYourTurn(team).into()),
            Some(_) => {}
        }
        let epoch = session.turn_number;

        let key = (session_id, epoch);
        if self.pending_hints.insert(key, ()).is_some() {
            return Err(ServiceError::HintPending);
        }
        let _pending = PendingHint {
            pending: &self.pending_hints,
            key,
        };

        let request = OracleRequest::from_session(&session, team);
        let suggestion = self.oracle.suggest(&request).await.map_err(|e| {
            tracing::warn!("Hint oracle failed for game {}: {}", session_id, e);
            e
        })?;

        let (session, hint) = self
            .mutate(session_id, |session| {
                if session.turn_number != epoch {
                    return Err(ServiceError::StaleState);
                }
                Self::automated_turn(session)?;
                TurnEngine::give_hint(session, codegiver_id, &suggestion.word, suggestion.count)
                    .map_err(|e| match e {
                        GameError::InvalidHint(reason) => ServiceError::OracleHintRejected(reason),
                        other => other.into(),
                    })
            })
            .await
            .inspect_err(|e| {
                if let ServiceError::OracleHintRejected(reason) = e {
                    tracing::warn!("Oracle hint rejected for game {}: {}", session_id, reason);
                }
            })?;

        tracing::info!(
            "Automated hint '{}' ({}) given for {} in game {}, requested by {}",
            hint.word,
            hint.count,
            team,
            session_id,
            requested_by
        );
        self.publish(&session, GameEvent::HintGiven { hint: hint.clone() })
            .await;
        Ok(hint)
    }

    /// Current state as `viewer_id` may see it. Unknown viewers get the
    /// masked board.
    pub async fn session_view(
        &self,
        session_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<SessionView, ServiceError> {
        let session = self.load(session_id).await?;
        let viewer = viewer_id.and_then(|id| session.player(id));
        Ok(SessionView::for_viewer(&session, viewer))
    }

    /// Public rooms still in the lobby, newest first
    pub async fn list_public_rooms(&self) -> Result<Vec<RoomSummary>, ServiceError> {
        let rooms = self.store.list_public_waiting(PUBLIC_ROOM_LIMIT).await?;
        Ok(rooms
            .iter()
            .map(|session| RoomSummary::new(session, self.max_players))
            .collect())
    }

    pub async fn list_word_packs(&self) -> Result<Vec<WordPack>, ServiceError> {
        Ok(self.word_packs.list().await?)
    }

    pub async fn get_word_pack(&self, pack_id: Uuid) -> Result<WordPackDetail, ServiceError> {
        let pack = self
            .word_packs
            .get(pack_id)
            .await?
            .ok_or(ServiceError::WordPackNotFound)?;
        let words = self.word_packs.words(pack_id).await?.unwrap_or_default();
        Ok(WordPackDetail { pack, words })
    }

    pub async fn create_word_pack(
        &self,
        name: &str,
        description: Option<String>,
        is_public: bool,
        language: Option<&str>,
        words: &[String],
    ) -> Result<WordPackDetail, ServiceError> {
        let name = Self::check_pack_name(name)?;
        let words = Self::normalize_words(words)?;
        let pack = WordPack::new(
            name,
            description.filter(|d| !d.trim().is_empty()),
            is_public,
            language.map(str::trim).filter(|l| !l.is_empty()).unwrap_or("en"),
        );

        self.word_packs.create(&pack, &words).await?;
        tracing::info!(
            "Word pack '{}' ({}) created with {} words",
            pack.name,
            pack.pack_id,
            words.len()
        );
        Ok(WordPackDetail { pack, words })
    }

    pub async fn update_word_pack(
        &self,
        pack_id: Uuid,
        changes: WordPackChanges,
    ) -> Result<WordPack, ServiceError> {
        let mut pack = self
            .word_packs
            .get(pack_id)
            .await?
            .ok_or(ServiceError::WordPackNotFound)?;

        if let Some(name) = changes.name.as_deref() {
            pack.name = Self::check_pack_name(name)?.to_string();
        }
        if let Some(description) = changes.description {
            pack.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(is_public) = changes.is_public {
            pack.is_public = is_public;
        }
        if let Some(language) = changes.language.as_deref().map(str::trim) {
            if language.is_empty() {
                return Err(ServiceError::BadRequest("language must not be empty"));
            }
            pack.language = language.to_string();
        }

        if !self.word_packs.update(&pack).await? {
            return Err(ServiceError::WordPackNotFound);
        }
        tracing::info!("Word pack {} updated", pack_id);
        Ok(pack)
    }

    /// Add words to a pack; ones it already holds are skipped
    pub async fn add_words(
        &self,
        pack_id: Uuid,
        words: &[String],
    ) -> Result<WordPackDetail, ServiceError> {
        let words = Self::normalize_words(words)?;
        if words.is_empty() {
            return Err(ServiceError::BadRequest("no words given"));
        }
        let added = self
            .word_packs
            .add_words(pack_id, &words)
            .await?
            .ok_or(ServiceError::WordPackNotFound)?;

        tracing::info!("Added {} words to word pack {}", added, pack_id);
        self.get_word_pack(pack_id).await
    }

    pub async fn delete_word(&self, pack_id: Uuid, word: &str) -> Result<(), ServiceError> {
        if self.word_packs.get(pack_id).await?.is_none() {
            return Err(ServiceError::WordPackNotFound);
        }
        let word = word.trim().to_uppercase();
        if !self.word_packs.delete_word(pack_id, &word).await? {
            return Err(ServiceError::WordNotFound(word));
        }
        Ok(())
    }

    /// Delete a pack. The default pack is what rooms fall back on, so it stays.
    pub async fn delete_word_pack(&self, pack_id: Uuid) -> Result<(), ServiceError> {
        let pack = self
            .word_packs
            .get(pack_id)
            .await?
            .ok_or(ServiceError::WordPackNotFound)?;
        if pack.is_default {
            return Err(ServiceError::BadRequest("the default word pack cannot be deleted"));
        }
        if !self.word_packs.delete(pack_id).await? {
            return Err(ServiceError::WordPackNotFound);
        }
        tracing::info!("Word pack '{}' ({}) deleted", pack.name, pack_id);
        Ok(())
    }

    /// Release lock entries for sessions with no request in flight
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }

    /// Drop rooms nobody will come back to: rooms left without a human for
    /// longer than `empty_grace`, and finished games idle for longer than
    /// `finished_grace`. Their room codes become free again.
    pub async fn evict_abandoned_sessions(
        &self,
        empty_grace: chrono::Duration,
        finished_grace: chrono::Duration,
    ) -> Result<usize, ServiceError> {
        let now = Utc::now();
        let evicted = self
            .store
            .evict_abandoned(now - empty_grace, now - finished_grace)
            .await?;
        if evicted > 0 {
            tracing::info!("Evicted {} abandoned rooms", evicted);
        }
        Ok(evicted)
    }

    async fn load(&self, session_id: Uuid) -> Result<GameSession, ServiceError> {
        self.store
            .load(session_id)
            .await?
            .ok_or(ServiceError::SessionNotFound)
    }

    async fn mutate<T, F>(&self, session_id: Uuid, op: F) -> Result<(GameSession, T), ServiceError>
    where
        F: FnOnce(&mut GameSession) -> Result<T, ServiceError>,
    {
        let _guard = self.locks.acquire(session_id).await;

        let mut session = self.load(session_id).await?;
        let expected = session.version;
        let result = op(&mut session)?;

        session.version = expected + 1;
        session.updated_at = Utc::now();
        self.store.save(&session, expected).await.map_err(|e| {
            if matches!(e, StoreError::VersionConflict { .. }) {
                tracing::warn!("Lost update race on game {} at version {}", session_id, expected);
            }
            ServiceError::from(e)
        })?;

        Ok((session, result))
    }

    async fn publish(&self, session: &GameSession, event: GameEvent) {
        self.broadcaster
            .publish(EventEnvelope {
                session_id: session.id,
                version: session.version,
                event,
            })
            .await;
    }

    /// Current team and its codegiver, provided that codegiver is automated
    /// and has not hinted this turn yet
    fn automated_turn(session: &GameSession) -> Result<(Team, Uuid), ServiceError> {
        if session.is_finished() {
            return Err(GameError::GameOver.into());
        }
        let team = session
            .current_turn
            .ok_or(GameError::not_playing(session.status))?;
        let codegiver = session
            .codegiver(team)
            .filter(|p| p.is_automated)
            .ok_or(GameError::NotAutomated)?;
        if session.has_hint_for_current_turn() {
            return Err(GameError::HintAlreadyIssued.into());
        }
        Ok((team, codegiver.id))
    }

    fn ensure_host(session: &GameSession, actor_id: Uuid) -> Result<(), GameError> {
        let actor = session.player(actor_id).ok_or(GameError::PlayerNotFound)?;
        if !actor.is_host {
            return Err(GameError::NotHost);
        }
        Ok(())
    }

    fn ensure_self_or_host(
        session: &GameSession,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<(), GameError> {
        if actor_id == target_id {
            return session
                .player(actor_id)
                .map(|_| ())
                .ok_or(GameError::PlayerNotFound);
        }
        Self::ensure_host(session, actor_id)
    }

    fn check_pack_name(name: &str) -> Result<&str, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::BadRequest("word pack name must not be empty"));
        }
        if name.chars().count() > 100 {
            return Err(ServiceError::BadRequest("word pack name is too long"));
        }
        Ok(name)
    }

    /// Board words are stored trimmed and uppercase, each at most once
    fn normalize_words(words: &[String]) -> Result<Vec<String>, ServiceError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(words.len());
        for word in words.iter().map(|w| w.trim()).filter(|w| !w.is_empty()) {
            if word.chars().count() > MAX_WORD_LENGTH {
                return Err(ServiceError::BadRequest("words must be at most 64 characters"));
            }
            let word = word.to_uppercase();
            if seen.insert(word.clone()) {
                normalized.push(word);
            }
        }
        Ok(normalized)
    }

    fn check_nickname(nickname: &str) -> Result<&str, ServiceError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(ServiceError::BadRequest("nickname must not be empty"));
        }
        Ok(nickname)
    }
}
