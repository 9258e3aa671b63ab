use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WordPack {
    pub pack_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    /// Used when a room does not pick a pack
    pub is_default: bool,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl WordPack {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        is_public: bool,
        language: impl Into<String>,
    ) -> Self {
        Self {
            pack_id: Uuid::new_v4(),
            name: name.into(),
            description,
            is_public,
            is_default: false,
            language: language.into(),
            created_at: Utc::now(),
        }
    }

    pub fn default_pack(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            pack_id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            is_public: true,
            is_default: true,
            language: language.into(),
            created_at: Utc::now(),
        }
    }
}

/// A pack together with its words
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPackDetail {
    #[serde(flatten)]
    pub pack: WordPack,
    pub words: Vec<String>,
}

/// Metadata edit; fields left out keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordPackChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub language: Option<String>,
}
