use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

use crate::game::room::MAX_PLAYERS;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub game: GameConfig,
    pub oracle: OracleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Without a URL the server keeps everything in memory
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub word_list_path: String,
    pub max_players: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Endpoint of the automated codegiver; unset disables automated hints
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        let database = DatabaseConfig {
            url: optional_var("DATABASE_URL"),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let game = GameConfig {
            word_list_path: env::var("WORD_LIST_PATH")
                .unwrap_or_else(|_| "./words.txt".to_string()),
            max_players: env::var("MAX_PLAYERS")
                .unwrap_or_else(|_| MAX_PLAYERS.to_string())
                .parse()
                .context("MAX_PLAYERS must be a number")?,
        };

        let oracle = OracleConfig {
            url: optional_var("ORACLE_URL"),
            api_key: optional_var("ORACLE_API_KEY"),
            timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("ORACLE_TIMEOUT_SECS must be a number")?,
        };

        Ok(Config {
            server,
            database,
            game,
            oracle,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Unset and blank are the same thing
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                frontend_url: "http://localhost:5173".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            game: GameConfig {
                word_list_path: "./words.txt".to_string(),
                max_players: MAX_PLAYERS,
            },
            oracle: OracleConfig {
                url: None,
                api_key: None,
                timeout_secs: 3,
            },
        };

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_url(), None);
        assert_eq!(config.oracle.timeout(), Duration::from_secs(3));
    }
}
