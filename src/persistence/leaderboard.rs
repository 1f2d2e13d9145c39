//! Global leaderboard
//!
//! Best-effort: a failed save reports `false`, a failed fetch yields an
//! empty list. Local scores are never touched from here.

use serde::{Deserialize, Serialize};

use super::error::{Result, StoreError};
use crate::highscores::MAX_HIGH_SCORES;
use crate::sim::FinalStats;

/// One row of the remote `scores` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteScore {
    pub score: u64,
    pub accuracy: f64,
    pub max_combo: u32,
    /// ISO-8601 creation time
    #[serde(default)]
    pub created_at: String,
}

impl RemoteScore {
    pub fn from_stats(stats: &FinalStats, created_at: String) -> Self {
        Self {
            score: stats.score,
            accuracy: stats.accuracy,
            max_combo: stats.max_combo,
            created_at,
        }
    }
}

/// Endpoint and anonymous API key of the hosted leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    pub url: String,
    pub key: String,
}

impl LeaderboardConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Option<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let key = key.into().trim().to_string();
        if url.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self { url, key })
    }

    /// Read `AIM_LEADERBOARD_URL` / `AIM_LEADERBOARD_KEY` baked in at build time
    pub fn from_build_env() -> Option<Self> {
        Self::new(
            option_env!("AIM_LEADERBOARD_URL")?,
            option_env!("AIM_LEADERBOARD_KEY")?,
        )
    }

    pub fn insert_url(&self) -> String {
        format!("{}/rest/v1/scores", self.url)
    }

    pub fn top_url(&self) -> String {
        format!(
            "{}/rest/v1/scores?select=*&order=score.desc&limit={}",
            self.url, MAX_HIGH_SCORES
        )
    }
}

/// Order rows by score (descending) and keep the top entries
pub fn normalize_top(mut rows: Vec<RemoteScore>) -> Vec<RemoteScore> {
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(MAX_HIGH_SCORES);
    rows
}

/// Remote leaderboard client
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    config: Option<LeaderboardConfig>,
}

impl Leaderboard {
    pub fn new(config: Option<LeaderboardConfig>) -> Self {
        Self { config }
    }

    pub fn from_build_env() -> Self {
        let config = LeaderboardConfig::from_build_env();
        if config.is_none() {
            log::info!("Global leaderboard disabled (no AIM_LEADERBOARD_URL/KEY)");
        }
        Self::new(config)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&LeaderboardConfig> {
        self.config.as_ref().ok_or(StoreError::Disabled)
    }

    /// Submit a finished session. Returns true on success.
    pub async fn save(&self, stats: &FinalStats) -> bool {
        match self.try_save(stats).await {
            Ok(()) => {
                log::info!("Score {} saved to global leaderboard", stats.score);
                true
            }
            Err(e) => {
                log::error!("Error saving score: {e}");
                false
            }
        }
    }

    /// Top scores, best first. Empty on any failure.
    pub async fn fetch_top(&self) -> Vec<RemoteScore> {
        match self.try_fetch_top().await {
            Ok(rows) => normalize_top(rows),
            Err(e) => {
                log::error!("Error fetching scores: {e}");
                Vec::new()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn try_save(&self, stats: &FinalStats) -> Result<()> {
        let config = self.config()?;
        let created_at: String = js_sys::Date::new_0().to_iso_string().into();
        let row = RemoteScore::from_stats(stats, created_at);
        let body = serde_json::to_string(&[row])?;
        web::send(config, "POST", &config.insert_url(), Some(body)).await?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    async fn try_fetch_top(&self) -> Result<Vec<RemoteScore>> {
        let config = self.config()?;
        let text = web::send(config, "GET", &config.top_url(), None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn try_save(&self, _stats: &FinalStats) -> Result<()> {
        self.config()?;
        Err(StoreError::Unavailable("HTTP client".into()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn try_fetch_top(&self) -> Result<Vec<RemoteScore>> {
        self.config()?;
        Err(StoreError::Unavailable("HTTP client".into()))
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::{LeaderboardConfig, Result, StoreError};

    /// Issue a request with the API key headers; returns the response body
    pub async fn send(
        config: &LeaderboardConfig,
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = body {
            opts.set_body(&wasm_bindgen::JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(StoreError::from_js)?;
        let headers = request.headers();
        headers
            .set("apikey", &config.key)
            .map_err(StoreError::from_js)?;
        headers
            .set("Authorization", &format!("Bearer {}", config.key))
            .map_err(StoreError::from_js)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(StoreError::from_js)?;

        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("window".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(StoreError::from_js)?
            .dyn_into()
            .map_err(StoreError::from_js)?;

        if !response.ok() {
            return Err(StoreError::Http(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(StoreError::from_js)?)
            .await
            .map_err(StoreError::from_js)?;
        Ok(text.as_string().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(score: u64) -> RemoteScore {
        RemoteScore {
            score,
            accuracy: 90.0,
            max_combo: 3,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_config_requires_url_and_key() {
        assert!(LeaderboardConfig::new("", "key").is_none());
        assert!(LeaderboardConfig::new("https://x.example", "  ").is_none());
        let config = LeaderboardConfig::new("https://x.example/", "key").unwrap();
        assert_eq!(config.url, "https://x.example");
    }

    #[test]
    fn test_urls() {
        let config = LeaderboardConfig::new("https://x.example", "key").unwrap();
        assert_eq!(config.insert_url(), "https://x.example/rest/v1/scores");
        assert_eq!(
            config.top_url(),
            "https://x.example/rest/v1/scores?select=*&order=score.desc&limit=10"
        );
    }

    #[test]
    fn test_normalize_top_sorts_and_truncates() {
        let rows = (0..15).map(|i| row(i * 10)).collect();
        let top = normalize_top(rows);
        assert_eq!(top.len(), MAX_HIGH_SCORES);
        assert_eq!(top[0].score, 140);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_row_shape() {
        let stats = FinalStats {
            score: 1230,
            accuracy: 87.5,
            max_combo: 9,
            hits: 7,
            total_clicks: 8,
        };
        let json = serde_json::to_value(RemoteScore::from_stats(
            &stats,
            "2026-01-01T00:00:00.000Z".into(),
        ))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "score": 1230,
                "accuracy": 87.5,
                "max_combo": 9,
                "created_at": "2026-01-01T00:00:00.000Z",
            })
        );
    }

    #[test]
    fn test_rows_parse_with_extra_columns() {
        let json = r#"[{"id":4,"score":500,"accuracy":75.0,"max_combo":2,"created_at":"x"}]"#;
        let rows: Vec<RemoteScore> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].score, 500);
    }

    #[test]
    fn test_disabled_without_config() {
        let board = Leaderboard::new(None);
        assert!(!board.is_enabled());
        assert!(matches!(board.config(), Err(StoreError::Disabled)));
    }
}
