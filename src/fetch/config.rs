//! Transport configuration: immutable defaults plus per-call overrides.
//!
//! [`TransportConfig::default()`] is the base option set. Callers pass a
//! [`TransportOverrides`] whose populated fields replace the matching
//! defaults (last write wins per field).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS, default_user_agent,
};

/// Errors for invalid transport configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Overrides could not be parsed (unknown key or wrong value type).
    #[error("invalid transport overrides: {0}")]
    Parse(#[from] serde_json::Error),

    /// A timeout of zero seconds was configured.
    #[error("{field} must be greater than zero")]
    ZeroTimeout {
        /// Name of the offending option.
        field: &'static str,
    },

    /// The user agent is empty.
    #[error("user_agent must not be empty")]
    EmptyUserAgent,
}

/// Address family used for outgoing connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpPreference {
    /// Any family the resolver returns.
    Any,
    /// IPv4 only.
    #[default]
    V4,
    /// IPv6 only.
    V6,
}

/// Full transport option set used to build a transfer client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum redirects to follow (0 disables redirects).
    pub max_redirects: usize,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total per-transfer timeout in seconds.
    pub timeout_secs: u64,
    /// Verify TLS certificates and host names.
    pub verify_tls: bool,
    /// Negotiate compressed response encodings.
    pub compression: bool,
    /// Send a `Referer` header when following redirects.
    pub auto_referer: bool,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Address family preference.
    pub ip_preference: IpPreference,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            compression: true,
            auto_referer: true,
            user_agent: default_user_agent(),
            ip_preference: IpPreference::default(),
        }
    }
}

impl TransportConfig {
    /// Returns a copy with every populated override applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &TransportOverrides) -> Self {
        let mut config = self.clone();
        if let Some(value) = overrides.max_redirects {
            config.max_redirects = value;
        }
        if let Some(value) = overrides.connect_timeout_secs {
            config.connect_timeout_secs = value;
        }
        if let Some(value) = overrides.timeout_secs {
            config.timeout_secs = value;
        }
        if let Some(value) = overrides.verify_tls {
            config.verify_tls = value;
        }
        if let Some(value) = overrides.compression {
            config.compression = value;
        }
        if let Some(value) = overrides.auto_referer {
            config.auto_referer = value;
        }
        if let Some(value) = &overrides.user_agent {
            config.user_agent.clone_from(value);
        }
        if let Some(value) = overrides.ip_preference {
            config.ip_preference = value;
        }
        config
    }

    /// Checks values the transport cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for zero timeouts and
    /// [`ConfigError::EmptyUserAgent`] for a blank user agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "connect_timeout_secs",
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "timeout_secs",
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}

/// Caller-supplied partial configuration. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportOverrides {
    /// Overrides [`TransportConfig::max_redirects`].
    pub max_redirects: Option<usize>,
    /// Overrides [`TransportConfig::connect_timeout_secs`].
    pub connect_timeout_secs: Option<u64>,
    /// Overrides [`TransportConfig::timeout_secs`].
    pub timeout_secs: Option<u64>,
    /// Overrides [`TransportConfig::verify_tls`].
    pub verify_tls: Option<bool>,
    /// Overrides [`TransportConfig::compression`].
    pub compression: Option<bool>,
    /// Overrides [`TransportConfig::auto_referer`].
    pub auto_referer: Option<bool>,
    /// Overrides [`TransportConfig::user_agent`].
    pub user_agent: Option<String>,
    /// Overrides [`TransportConfig::ip_preference`].
    pub ip_preference: Option<IpPreference>,
}

impl TransportOverrides {
    /// Parses overrides from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for unknown keys or mistyped values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_redirects: other.max_redirects.or(self.max_redirects),
            connect_timeout_secs: other.connect_timeout_secs.or(self.connect_timeout_secs),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            verify_tls: other.verify_tls.or(self.verify_tls),
            compression: other.compression.or(self.compression),
            auto_referer: other.auto_referer.or(self.auto_referer),
            user_agent: other.user_agent.or(self.user_agent),
            ip_preference: other.ip_preference.or(self.ip_preference),
        }
    }
}
