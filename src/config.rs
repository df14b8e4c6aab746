use anyhow::Context;
use api::gemini;
use core::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings read once at start-up.
pub struct Config {
    pub port: u16,
    /// Upper bound on a single model call.
    pub timeout: Duration,
    pub gemini: gemini::Config,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let key = lookup("GOOGLE_API_KEY").filter(|key| !key.is_empty()).context("GOOGLE_API_KEY must be set")?;
        let port = match lookup("PORT") {
            Some(port) => port.parse().context("PORT must be a port number")?,
            _ => DEFAULT_PORT,
        };
        let secs = match lookup("GEMINI_TIMEOUT") {
            Some(secs) => secs.parse().context("GEMINI_TIMEOUT must be a whole number of seconds")?,
            _ => DEFAULT_TIMEOUT_SECS,
        };
        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.into());
        let endpoint = lookup("GEMINI_ENDPOINT").unwrap_or_else(|| gemini::DEFAULT_ENDPOINT.into());

        Ok(Self { port, timeout: Duration::from_secs(secs), gemini: gemini::Config { key, model, endpoint } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<_, _> = vars.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config(&[("GOOGLE_API_KEY", "secret")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.gemini.key, "secret");
        assert_eq!(config.gemini.model, gemini::DEFAULT_MODEL);
        assert_eq!(config.gemini.endpoint, gemini::DEFAULT_ENDPOINT);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("GOOGLE_API_KEY", "secret"),
            ("PORT", "3000"),
            ("GEMINI_TIMEOUT", "5"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_ENDPOINT", "http://localhost:9999"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.endpoint, "http://localhost:9999");
    }

    #[test]
    fn requires_api_key() {
        assert!(config(&[]).is_err());
        assert!(config(&[("GOOGLE_API_KEY", "")]).is_err());
    }

    #[test]
    fn rejects_invalid_numbers() {
        assert!(config(&[("GOOGLE_API_KEY", "secret"), ("PORT", "http")]).is_err());
        assert!(config(&[("GOOGLE_API_KEY", "secret"), ("GEMINI_TIMEOUT", "-1")]).is_err());
    }
}
