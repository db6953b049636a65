use std::str::FromStr;
use thiserror::Error;

/// 永続化の実装
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// 設定値のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 起動時に環境変数から読み込む設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub storage: StorageBackend,
}

impl AppConfig {
    const DEFAULT_DATABASE_URL: &'static str = "postgres://localhost/shareit";
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_PORT: u16 = 3000;

    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む
    ///
    /// 未設定の項目は既定値。設定されているが解釈できない値はエラー。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string());
        let database_max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            Self::DEFAULT_MAX_CONNECTIONS,
        )?;
        let port = parse_or(&lookup, "PORT", Self::DEFAULT_PORT)?;
        let storage = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?;

        Ok(Self {
            database_url,
            database_max_connections,
            port,
            storage,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
