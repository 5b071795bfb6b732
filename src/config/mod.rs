// src/config/mod.rs
// All values load from the environment (.env supported) with sensible defaults

use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct KokoroConfig {
    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Server Configuration
    pub host: String,
    pub port: u16,

    // ── Gemini Configuration
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub gemini_max_output_tokens: u32,
    pub gemini_timeout_secs: u64,

    // ── Session Cache Configuration
    pub session_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,

    // ── Logging Configuration
    pub log_level: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        // A missing variable is not an error, just use the default.
        Err(_) => default,
    }
}

impl KokoroConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            database_url: env_var_or("DATABASE_URL", "sqlite:./kokoro.db?mode=rwc".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            host: env_var_or("KOKORO_HOST", "0.0.0.0".to_string()),
            port: env_var_or("KOKORO_PORT", 3001),
            gemini_api_key: env_var_or("GEMINI_API_KEY", String::new()),
            gemini_model: env_var_or("GEMINI_MODEL", "gemini-1.5-pro".to_string()),
            gemini_temperature: env_var_or("GEMINI_TEMPERATURE", 0.7),
            gemini_max_output_tokens: env_var_or("GEMINI_MAX_OUTPUT_TOKENS", 800),
            gemini_timeout_secs: env_var_or("GEMINI_TIMEOUT", 60),
            session_ttl_secs: env_var_or("KOKORO_SESSION_TTL", 3600),
            cache_sweep_interval_secs: env_var_or("KOKORO_CACHE_SWEEP_INTERVAL", 300),
            log_level: env_var_or("KOKORO_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Idle lifetime of a cached chat session
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// How often the background sweeper purges expired cache entries
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<KokoroConfig> = Lazy::new(KokoroConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KokoroConfig {
        KokoroConfig {
            database_url: "sqlite::memory:".to_string(),
            sqlite_max_connections: 5,
            host: "127.0.0.1".to_string(),
            port: 3001,
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-pro".to_string(),
            gemini_temperature: 0.7,
            gemini_max_output_tokens: 800,
            gemini_timeout_secs: 60,
            session_ttl_secs: 3600,
            cache_sweep_interval_secs: 300,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        assert_eq!(sample().bind_address(), "127.0.0.1:3001");
    }

    #[test]
    fn durations_convert_from_seconds() {
        let config = sample();
        assert_eq!(config.session_ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }
}
