use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_PHONE_PREFIX: &str = "+39";
pub const DEFAULT_ADULT_AGE: i32 = 18;
pub const DEFAULT_MIN_PHONE_LENGTH: usize = 9;
pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_phone_prefix: String,
    pub adult_age: i32,
    pub min_phone_length: usize,
    pub api_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_phone_prefix: DEFAULT_PHONE_PREFIX.to_string(),
            adult_age: DEFAULT_ADULT_AGE,
            min_phone_length: DEFAULT_MIN_PHONE_LENGTH,
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            default_phone_prefix: env::var("FORM_DEFAULT_PHONE_PREFIX")
                .unwrap_or_else(|_| {
                    warn!("FORM_DEFAULT_PHONE_PREFIX not set, using default");
                    DEFAULT_PHONE_PREFIX.to_string()
                }),
            adult_age: parse_or_default("FORM_ADULT_AGE", DEFAULT_ADULT_AGE),
            min_phone_length: parse_or_default("FORM_MIN_PHONE_LENGTH", DEFAULT_MIN_PHONE_LENGTH),
            api_port: parse_or_default("API_PORT", DEFAULT_API_PORT),
        };

        if !config.is_configured() {
            warn!("Form configuration looks inconsistent - check FORM_* environment variables");
        }

        config
    }

    /// A usable configuration needs a calling-code prefix and a positive adult age.
    pub fn is_configured(&self) -> bool {
        !self.default_phone_prefix.trim().is_empty() && self.adult_age > 0
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_configured() {
        let config = AppConfig::default();
        assert_eq!(config.default_phone_prefix, "+39");
        assert_eq!(config.adult_age, 18);
        assert_eq!(config.min_phone_length, 9);
        assert!(config.is_configured());
    }

    #[test]
    fn test_blank_prefix_is_not_configured() {
        let config = AppConfig {
            default_phone_prefix: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_parse_or_default_falls_back_on_garbage() {
        env::set_var("FORM_TEST_GARBAGE_AGE", "eighteen");
        assert_eq!(parse_or_default("FORM_TEST_GARBAGE_AGE", 18), 18);
        env::set_var("FORM_TEST_VALID_AGE", " 21 ");
        assert_eq!(parse_or_default("FORM_TEST_VALID_AGE", 18), 21);
        assert_eq!(parse_or_default::<u16>("FORM_TEST_MISSING_PORT", 3000), 3000);
    }
}
