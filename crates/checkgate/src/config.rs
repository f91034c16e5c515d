//! Server configuration from flags and environment variables.
//!
//! Every option can be given as a flag or through its environment
//! variable; flags win. Defaults match a single local Redis on the
//! standard port.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use checkgate_session::{CodeFormat, KeyStrategy, SessionConfig};
use checkgate_store::{RedisStore, StoreConfig};

/// Which store backend holds the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// A Redis server shared by all replicas.
    Redis,
    /// An in-process map. Codes are lost on exit and not shared.
    Memory,
}

/// How store keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyMode {
    /// `event:{eventId}:session:{sessionId}`, codes never expire.
    Event,
    /// `session:{sessionId}`, codes expire after the code TTL.
    SelfExpiring,
}

/// Shape of generated codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodeStyle {
    /// Six decimal digits.
    Digits,
    /// Lowercase hex of `--hex-len` characters.
    Hex,
}

/// Command-line and environment configuration for the `checkgate` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "checkgate", version, about = "Rotating check-in access codes")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "CHECKGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    #[arg(long, env = "REDIS_HOST", default_value = "localhost")]
    pub redis_host: String,

    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    /// Where codes are stored.
    #[arg(long, env = "CHECKGATE_STORE", value_enum, default_value_t = StoreKind::Redis)]
    pub store: StoreKind,

    /// Store key layout and expiry.
    #[arg(long, env = "CHECKGATE_MODE", value_enum, default_value_t = KeyMode::Event)]
    pub mode: KeyMode,

    /// Code lifetime in self-expiring mode, in seconds.
    #[arg(long, env = "CHECKGATE_CODE_TTL_SECS", default_value_t = 60)]
    pub code_ttl_secs: u64,

    #[arg(long, env = "CHECKGATE_CODE_FORMAT", value_enum, default_value_t = CodeStyle::Digits)]
    pub code_format: CodeStyle,

    /// Length of hex codes, clamped to 4..=128.
    #[arg(long, env = "CHECKGATE_HEX_LEN", default_value_t = CodeFormat::DEFAULT_HEX_LEN)]
    pub hex_len: usize,

    /// Default rotation period in seconds for sessions that don't ask for
    /// one. Unset or 0 means codes only rotate on request.
    #[arg(long, env = "CHECKGATE_ROTATION_SECS")]
    pub rotation_secs: Option<u64>,

    /// How often to log the number of active sessions, in seconds.
    #[arg(long, env = "CHECKGATE_REPORT_INTERVAL_SECS", default_value_t = 30)]
    pub report_interval_secs: u64,

    /// Timeout for a single store operation, in milliseconds.
    #[arg(long, env = "CHECKGATE_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,
}

impl ServerConfig {
    /// `host:port` to bind the HTTP listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn redis_url(&self) -> String {
        RedisStore::url(&self.redis_host, self.redis_port)
    }

    /// Session-layer settings derived from the flags.
    pub fn session_config(&self) -> SessionConfig {
        let code_format = match self.code_format {
            CodeStyle::Digits => CodeFormat::Digits,
            CodeStyle::Hex => CodeFormat::Hex { len: self.hex_len },
        };
        let key_strategy = match self.mode {
            KeyMode::Event => KeyStrategy::EventScoped,
            KeyMode::SelfExpiring => KeyStrategy::SelfExpiring {
                ttl: Duration::from_secs(self.code_ttl_secs),
            },
        };
        SessionConfig {
            code_format,
            key_strategy,
            rotation_period: self
                .rotation_secs
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            ..SessionConfig::default()
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            io_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}
