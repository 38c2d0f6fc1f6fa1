//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use bluff::RoomConfig;
use std::net::SocketAddr;

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Rules applied to every room
    pub rooms: RoomConfig,
    /// Per-connection inbound message limits
    pub rate_limits: RateLimitConfig,
}

/// Per-connection WebSocket message limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Messages allowed per second
    pub burst_per_second: usize,
    /// Messages allowed per minute
    pub sustained_per_minute: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst_per_second: 10,
            sustained_per_minute: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` is set but is not a socket address
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, |key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(
        bind_override: Option<SocketAddr>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => {
                let raw = lookup("SERVER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?
            }
        };

        let room_defaults = RoomConfig::default();
        let rooms = RoomConfig {
            max_players: parse_or(&lookup, "ROOM_MAX_PLAYERS", room_defaults.max_players),
            hand_size: parse_or(&lookup, "ROOM_HAND_SIZE", room_defaults.hand_size),
        };

        let limit_defaults = RateLimitConfig::default();
        let rate_limits = RateLimitConfig {
            burst_per_second: parse_or(&lookup, "WS_BURST_LIMIT", limit_defaults.burst_per_second),
            sustained_per_minute: parse_or(
                &lookup,
                "WS_SUSTAINED_LIMIT",
                limit_defaults.sustained_per_minute,
            ),
        };

        Ok(ServerConfig {
            bind,
            rooms,
            rate_limits,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limits.burst_per_second == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_BURST_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.rate_limits.sustained_per_minute < self.rate_limits.burst_per_second {
            return Err(ConfigError::Invalid {
                var: "WS_SUSTAINED_LIMIT".to_string(),
                reason: format!(
                    "Must be at least the burst limit ({})",
                    self.rate_limits.burst_per_second
                ),
            });
        }

        self.rooms
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "ROOM_MAX_PLAYERS/ROOM_HAND_SIZE".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parses a variable, falling back to `default` when unset or unparseable
fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
