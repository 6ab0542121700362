/// CLI configuration
///
/// # Environment Variables
///
/// - `GANTT_API_URL`: API root (default: `http://localhost:5000/api`)
/// - `GANTT_USER`: Viewer's display name; when unset the CLI lists users
/// - `GANTT_TOKEN`: Bearer token sent with every request (optional)
/// - `GANTT_VIEW`: `individual` or `team` (default: individual)
/// - `GANTT_ZOOM`: `day`, `week` or `month` (default: week)
/// - `GANTT_CACHE_PATH`: Local task cache file (default: `.gantt/tasks.json`)
/// - `GANTT_TIMEOUT_SECS`: Per-request timeout (default: 10)

use crate::controller::ViewScope;
use crate::timeline::Zoom;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_CACHE_PATH: &str = ".gantt/tasks.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub user: Option<String>,
    pub token: Option<String>,
    pub view: ViewScope,
    pub zoom: Zoom,
    pub cache_path: PathBuf,
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Loads configuration from the environment (and `.env` when present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let view = match get("GANTT_VIEW") {
            Some(v) => v.parse()?,
            None => ViewScope::default(),
        };
        let zoom = match get("GANTT_ZOOM") {
            Some(v) => v.parse()?,
            None => Zoom::default(),
        };
        let timeout_secs = match get("GANTT_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>()?,
            None => 10,
        };
        if timeout_secs == 0 {
            anyhow::bail!("GANTT_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            api_url: get("GANTT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            user: get("GANTT_USER").map(|u| u.trim().to_string()),
            token: get("GANTT_TOKEN"),
            view,
            zoom,
            cache_path: get("GANTT_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ClientConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.user, None);
        assert_eq!(config.view, ViewScope::Individual);
        assert_eq!(config.zoom, Zoom::Week);
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("GANTT_API_URL", "https://gantt.example.com/api"),
            ("GANTT_USER", " João Victor "),
            ("GANTT_VIEW", "team"),
            ("GANTT_ZOOM", "month"),
            ("GANTT_TOKEN", ""),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://gantt.example.com/api");
        assert_eq!(config.user.as_deref(), Some("João Victor"));
        assert_eq!(config.view, ViewScope::Team);
        assert_eq!(config.zoom, Zoom::Month);
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("GANTT_ZOOM", "year")]).is_err());
        assert!(config(&[("GANTT_VIEW", "everyone")]).is_err());
        assert!(config(&[("GANTT_TIMEOUT_SECS", "0")]).is_err());
    }
}
