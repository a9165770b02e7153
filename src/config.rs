use chrono::FixedOffset;
use std::env;
use std::fmt;

/// Runtime settings, read once at startup and shared with handlers as
/// `web::Data<AppConfig>`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub app_name: String,
    /// Operational timezone for "today"; `None` means the server's local time.
    pub report_utc_offset: Option<FixedOffset>,
    pub admin_email: String,
    pub admin_password: String,
    pub static_dir: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "Invalid {key}='{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/beadle.db".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
            session_key: None,
            app_name: "Beadle System".to_string(),
            report_utc_offset: None,
            admin_email: "admin@school.local".to_string(),
            admin_password: "admin123".to_string(),
            static_dir: "./static".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str, default: String| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default)
        };

        let report_utc_offset = match lookup("REPORT_UTC_OFFSET").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(parse_utc_offset(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "REPORT_UTC_OFFSET",
                value: raw.clone(),
                reason: "expected +HH:MM or -HH:MM".to_string(),
            })?),
            None => None,
        };

        let bind_addr = get("BIND_ADDR", defaults.bind_addr);
        if !bind_addr.contains(':') {
            return Err(ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_addr,
                reason: "expected host:port".to_string(),
            });
        }

        Ok(Self {
            database_url: get("DATABASE_URL", defaults.database_url),
            bind_addr,
            session_key: lookup("SESSION_KEY").filter(|v| !v.is_empty()),
            app_name: get("APP_NAME", defaults.app_name),
            report_utc_offset,
            admin_email: get("ADMIN_EMAIL", defaults.admin_email),
            admin_password: get("ADMIN_PASSWORD", defaults.admin_password),
            static_dir: get("STATIC_DIR", defaults.static_dir),
        })
    }
}

/// Parse "+HH:MM", "-HH:MM" or "Z".
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw == "UTC" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = h.parse().ok()?;
    let minutes: i32 = m.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.report_utc_offset, None);
        assert_eq!(cfg.session_key, None);
    }

    #[test]
    fn reads_offset_and_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("REPORT_UTC_OFFSET", "-05:00"),
            ("APP_NAME", "St. Mary's Beadles"),
        ]))
        .unwrap();
        assert_eq!(cfg.report_utc_offset, FixedOffset::west_opt(5 * 3600));
        assert_eq!(cfg.app_name, "St. Mary's Beadles");
    }

    #[test]
    fn rejects_bad_offset() {
        let err = AppConfig::from_lookup(lookup_from(&[("REPORT_UTC_OFFSET", "EST")])).unwrap_err();
        assert!(err.to_string().contains("REPORT_UTC_OFFSET"));
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("+08:00"), FixedOffset::east_opt(8 * 3600));
        assert_eq!(parse_utc_offset("-04"), FixedOffset::west_opt(4 * 3600));
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+15:00"), None);
    }
}
