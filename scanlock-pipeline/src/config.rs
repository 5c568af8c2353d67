//! Link configuration.
//!
//! Loaded from a TOML file or built programmatically. The pre-shared key,
//! the line width, and the protocol constants baked into `scanlock-core`
//! must agree between the two sides out-of-band; any mismatch produces a
//! permanently garbled picture, not a detectable protocol error.

use scanlock_types::{LinkError, Role};
use serde::{Deserialize, Deserializer};

/// Configuration for one side of a scanlock link.
///
/// ```toml
/// role = "receiver"
/// preshared_key = "123456789ABCDEF0"
/// line_width = 720
/// channel_depth = 4
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Which side of the link this node is.
    pub role: Role,
    /// The 64-bit pre-shared key, written as hex in config files.
    #[serde(deserialize_with = "key_from_hex")]
    pub preshared_key: u64,
    /// Active-line width in bytes (default: 720).
    #[serde(default = "default_line_width")]
    pub line_width: usize,
    /// Inter-stage channel capacity in messages (default: 4).
    ///
    /// Small on purpose: a full channel blocks acquisition, which is the
    /// system's only back-pressure mechanism.
    #[serde(default = "default_channel_depth")]
    pub channel_depth: usize,
}

impl LinkConfig {
    /// Build a config with production defaults for width and depth.
    pub fn new(role: Role, preshared_key: u64) -> Self {
        Self {
            role,
            preshared_key,
            line_width: default_line_width(),
            channel_depth: default_channel_depth(),
        }
    }

    /// Parse and validate a TOML config document.
    pub fn from_toml(text: &str) -> Result<Self, LinkError> {
        let config: Self = toml::from_str(text).map_err(|e| LinkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.line_width == 0 {
            return Err(LinkError::Config("line_width must be non-zero".into()));
        }
        if self.channel_depth == 0 {
            return Err(LinkError::Config("channel_depth must be non-zero".into()));
        }
        Ok(())
    }
}

fn default_line_width() -> usize {
    720
}

fn default_channel_depth() -> usize {
    4
}

fn key_from_hex<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let digits = text.trim_start_matches("0x");
    u64::from_str_radix(digits, 16)
        .map_err(|e| serde::de::Error::custom(format!("preshared_key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = LinkConfig::from_toml(
            r#"
            role = "transmitter"
            preshared_key = "123456789ABCDEF0"
            line_width = 640
            channel_depth = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.role, Role::Transmitter);
        assert_eq!(config.preshared_key, 0x1234_5678_9ABC_DEF0);
        assert_eq!(config.line_width, 640);
        assert_eq!(config.channel_depth, 8);
    }

    #[test]
    fn width_and_depth_default() {
        let config = LinkConfig::from_toml(
            r#"
            role = "receiver"
            preshared_key = "0xDEADBEEF"
            "#,
        )
        .unwrap();

        assert_eq!(config.line_width, 720);
        assert_eq!(config.channel_depth, 4);
        assert_eq!(config.preshared_key, 0xDEAD_BEEF);
    }

    #[test]
    fn rejects_bad_key() {
        let err = LinkConfig::from_toml(
            r#"
            role = "receiver"
            preshared_key = "not hex"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Config(_)));
    }

    #[test]
    fn rejects_zero_width() {
        let err = LinkConfig::from_toml(
            r#"
            role = "receiver"
            preshared_key = "1"
            line_width = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Config(_)));
    }
}
