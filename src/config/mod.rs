use crate::error::{Error, Result};
use crate::matching::DEFAULT_THRESHOLD;
use crate::store::validate_identifier;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "את קוקישף 🍪 — עוזרת קולינרית טבעונית מבית קוקי כיף. עני בעברית, בחום ובקצרה.";

/// Requests per second per client; the burst allowance is twice this
pub const MAX_API_RATE_LIMIT: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub completion: CompletionConfig,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// PostgREST API of a hosted Supabase project
    Supabase,
    /// Direct SQL connection
    Sql,
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "supabase" | "postgrest" => Ok(SourceKind::Supabase),
            "sql" | "postgres" | "database" => Ok(SourceKind::Sql),
            other => Err(Error::Config(format!("Unknown RECIPE_SOURCE: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kind: SourceKind,
    pub supabase_url: Option<String>,
    #[serde(skip_serializing)]
    pub supabase_key: Option<String>,
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub table: String,
    pub text_column: String,
    /// Column PostgREST pages are ordered by
    pub order_column: String,
    pub page_size: usize,
    /// Seconds between background reloads, 0 disables them
    pub refresh_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub threshold: f64,
    pub featured_keywords: Vec<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env_or(name, default)
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let kind: SourceKind = env_or("RECIPE_SOURCE", "supabase").parse()?;

        let featured_keywords = env_or("FEATURED_KEYWORDS", "שוקולד")
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Settings {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: parse_env("PORT", "10000")?,
                cors_origin: env_or("CORS_ORIGIN", "https://cookiecef.co.il"),
                api_rate_limit: parse_env("API_RATE_LIMIT", "10")?,
                max_request_body_size: parse_env("MAX_REQUEST_BODY_SIZE", "65536")?,
            },
            store: StoreConfig {
                kind,
                supabase_url: std::env::var("SUPABASE_URL").ok(),
                supabase_key: std::env::var("SUPABASE_KEY").ok(),
                database_url: std::env::var("DATABASE_URL").ok(),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "5")?,
                table: env_or("RECIPE_TABLE", "recipes_raw_view"),
                text_column: env_or("RECIPE_TEXT_COLUMN", "raw_text"),
                order_column: env_or("RECIPE_ORDER_COLUMN", "title"),
                page_size: parse_env("STORE_PAGE_SIZE", "1000")?,
                refresh_interval_seconds: parse_env("REFRESH_INTERVAL", "0")?,
            },
            completion: CompletionConfig {
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
                model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
                temperature: parse_env("OPENAI_TEMPERATURE", "0.4")?,
                max_tokens: parse_env("OPENAI_MAX_TOKENS", "900")?,
                timeout_seconds: parse_env("OPENAI_TIMEOUT", "60")?,
                system_prompt: env_or("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            },
            matcher: MatcherConfig {
                threshold: parse_env("MATCH_THRESHOLD", &DEFAULT_THRESHOLD.to_string())?,
                featured_keywords,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if self.server.api_rate_limit > MAX_API_RATE_LIMIT {
            return Err(Error::Config(format!(
                "API_RATE_LIMIT must be at most {MAX_API_RATE_LIMIT}"
            )));
        }

        if !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(Error::Config(
                "MATCH_THRESHOLD must be between 0 and 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(Error::Config(
                "OPENAI_TEMPERATURE must be between 0 and 2".to_string(),
            ));
        }

        if self.store.page_size == 0 {
            return Err(Error::Config("STORE_PAGE_SIZE must be non-zero".to_string()));
        }

        validate_identifier(&self.store.order_column)
            .map_err(|_| Error::Config("RECIPE_ORDER_COLUMN is not a valid column".to_string()))?;

        match self.store.kind {
            SourceKind::Supabase => {
                let url = self.store.supabase_url.as_deref().ok_or_else(|| {
                    Error::Config("SUPABASE_URL is required for the supabase source".to_string())
                })?;
                url::Url::parse(url)?;
                if self.store.supabase_key.is_none() {
                    return Err(Error::Config(
                        "SUPABASE_KEY is required for the supabase source".to_string(),
                    ));
                }
            }
            SourceKind::Sql => {
                if self.store.database_url.is_none() {
                    return Err(Error::Config(
                        "DATABASE_URL is required for the sql source".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Extra check for commands that answer general questions
    pub fn require_completion(&self) -> Result<&str> {
        self.completion
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required".to_string()))
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 10000,
            cors_origin: "https://cookiecef.co.il".to_string(),
            api_rate_limit: 10,
            max_request_body_size: 65536,
        },
        store: StoreConfig {
            kind: SourceKind::Supabase,
            supabase_url: Some("https://example.supabase.co".to_string()),
            supabase_key: Some("anon".to_string()),
            database_url: None,
            max_connections: 5,
            table: "recipes_raw_view".to_string(),
            text_column: "raw_text".to_string(),
            order_column: "title".to_string(),
            page_size: 1000,
            refresh_interval_seconds: 0,
        },
        completion: CompletionConfig {
            api_key: Some("test-key".to_string()),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            max_tokens: 900,
            timeout_seconds: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        },
        matcher: MatcherConfig {
            threshold: DEFAULT_THRESHOLD,
            featured_keywords: vec!["שוקולד".to_string()],
        },
    }
}
