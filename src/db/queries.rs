use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Result};
use uuid::Uuid;

use crate::models::{GameSession, WordPack};

/// Row shape of `game_sessions`. Only the snapshot is read back into a
/// [`GameSession`]; the other columns exist for indexing and ad-hoc queries.
#[derive(Debug, Clone, FromRow)]
pub struct GameSessionRow {
    pub game_id: Uuid,
    pub room_code: String,
    pub version: i64,
    pub snapshot: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

// Session queries
pub async fn insert_session(
    pool: &PgPool,
    session: &GameSession,
    snapshot: serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO game_sessions (
            game_id, room_code, name, word_pack_id, is_public, status,
            current_turn, winner, version, snapshot, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(session.id)
    .bind(&session.code)
    .bind(&session.name)
    .bind(session.word_pack_id)
    .bind(session.is_public)
    .bind(session.status.as_str())
    .bind(session.current_turn.map(|t| t.as_str()))
    .bind(session.winner.map(|t| t.as_str()))
    .bind(session.version)
    .bind(snapshot)
    .bind(session.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_session(pool: &PgPool, game_id: Uuid) -> Result<Option<GameSessionRow>> {
    sqlx::query_as::<_, GameSessionRow>(
        "SELECT game_id, room_code, version, snapshot, updated_at FROM game_sessions WHERE game_id = $1",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_session_by_code(pool: &PgPool, room_code: &str) -> Result<Option<GameSessionRow>> {
    sqlx::query_as::<_, GameSessionRow>(
        "SELECT game_id, room_code, version, snapshot, updated_at FROM game_sessions WHERE room_code = $1",
    )
    .bind(room_code)
    .fetch_optional(pool)
    .await
}

/// Conditional update: only applies if the row is still at `expected_version`.
///
/// # Returns
/// Number of rows updated (0 means another writer got there first, or the
/// session does not exist)
pub async fn update_session_if_version(
    pool: &PgPool,
    session: &GameSession,
    snapshot: serde_json::Value,
    expected_version: i64,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE game_sessions
        SET status = $1,
            current_turn = $2,
            winner = $3,
            version = $4,
            snapshot = $5,
            updated_at = NOW()
        WHERE game_id = $6 AND version = $7
        "#,
    )
    .bind(session.status.as_str())
    .bind(session.current_turn.map(|t| t.as_str()))
    .bind(session.winner.map(|t| t.as_str()))
    .bind(session.version)
    .bind(snapshot)
    .bind(session.id)
    .bind(expected_version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn session_exists(pool: &PgPool, game_id: Uuid) -> Result<bool> {
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM game_sessions WHERE game_id = $1)")
            .bind(game_id)
            .fetch_one(pool)
            .await?;
    Ok(exists.0)
}

pub async fn list_public_waiting_sessions(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<GameSessionRow>> {
    sqlx::query_as::<_, GameSessionRow>(
        r#"
        SELECT game_id, room_code, version, snapshot, updated_at
        FROM game_sessions
        WHERE is_public AND status = 'waiting'
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Delete rooms without a human player idle since `empty_before`, and
/// finished games idle since `finished_before`.
///
/// # Returns
/// Number of sessions deleted
pub async fn delete_abandoned_sessions(
    pool: &PgPool,
    empty_before: DateTime<Utc>,
    finished_before: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM game_sessions
        WHERE (status = 'finished' AND updated_at <= $2)
           OR (updated_at <= $1
               AND NOT jsonb_path_exists(snapshot, '$.players[*] ? (@.is_automated == false)'))
        "#,
    )
    .bind(empty_before)
    .bind(finished_before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

// Word pack queries
pub async fn list_word_packs(pool: &PgPool) -> Result<Vec<WordPack>> {
    sqlx::query_as::<_, WordPack>(
        r#"
        SELECT pack_id, name, description, is_public, is_default, language, created_at
        FROM word_packs
        WHERE is_public OR is_default
        ORDER BY is_default DESC, created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_word_pack(pool: &PgPool, pack_id: Uuid) -> Result<Option<WordPack>> {
    sqlx::query_as::<_, WordPack>(
        r#"
        SELECT pack_id, name, description, is_public, is_default, language, created_at
        FROM word_packs
        WHERE pack_id = $1
        "#,
    )
    .bind(pack_id)
    .fetch_optional(pool)
    .await
}

pub async fn word_pack_exists(pool: &PgPool, pack_id: Uuid) -> Result<bool> {
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM word_packs WHERE pack_id = $1)")
            .bind(pack_id)
            .fetch_one(pool)
            .await?;
    Ok(exists.0)
}

pub async fn get_pack_words(pool: &PgPool, pack_id: Uuid) -> Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT word FROM words WHERE pack_id = $1 ORDER BY word_id")
        .bind(pack_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(word,)| word).collect())
}

/// Create a word pack together with its words in one transaction
pub async fn create_word_pack(pool: &PgPool, pack: &WordPack, words: &[String]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO word_packs (pack_id, name, description, is_public, is_default, language, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(pack.pack_id)
    .bind(&pack.name)
    .bind(&pack.description)
    .bind(pack.is_public)
    .bind(pack.is_default)
    .bind(&pack.language)
    .bind(pack.created_at)
    .execute(&mut *tx)
    .await?;

    insert_words(&mut *tx, pack.pack_id, words).await?;

    tx.commit().await?;
    Ok(())
}

/// # Returns
/// Number of rows updated (0 if the pack does not exist)
pub async fn update_word_pack(pool: &PgPool, pack: &WordPack) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE word_packs
        SET name = $1, description = $2, is_public = $3, language = $4
        WHERE pack_id = $5
        "#,
    )
    .bind(&pack.name)
    .bind(&pack.description)
    .bind(pack.is_public)
    .bind(&pack.language)
    .bind(pack.pack_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Add words to an existing pack in one transaction
///
/// # Returns
/// Number of words that were not in the pack yet
pub async fn add_words(pool: &PgPool, pack_id: Uuid, words: &[String]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let added = insert_words(&mut *tx, pack_id, words).await?;
    tx.commit().await?;
    Ok(added)
}

async fn insert_words(conn: &mut PgConnection, pack_id: Uuid, words: &[String]) -> Result<u64> {
    let mut added = 0;
    for word in words {
        let result = sqlx::query(
            r#"
            INSERT INTO words (pack_id, word)
            VALUES ($1, $2)
            ON CONFLICT (pack_id, word) DO NOTHING
            "#,
        )
        .bind(pack_id)
        .bind(word)
        .execute(&mut *conn)
        .await?;
        added += result.rows_affected();
    }
    Ok(added)
}

pub async fn delete_word(pool: &PgPool, pack_id: Uuid, word: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM words WHERE pack_id = $1 AND word = $2")
        .bind(pack_id)
        .bind(word)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Words go with the pack (ON DELETE CASCADE)
pub async fn delete_word_pack(pool: &PgPool, pack_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM word_packs WHERE pack_id = $1")
        .bind(pack_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
