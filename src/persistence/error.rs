/// Result alias for storage and leaderboard operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures of the score storage and remote leaderboard.
///
/// None of these reach gameplay: callers log them and fall back to an empty
/// list or a `false` success flag.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store does not exist on this platform/browser
    #[error("{0} is not available")]
    Unavailable(String),
    /// The remote leaderboard has no URL/key configured
    #[error("remote leaderboard is not configured")]
    Disabled,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Non-2xx HTTP response
    #[error("leaderboard returned HTTP {0}")]
    Http(u16),
    /// A JavaScript exception, stringified
    #[error("{0}")]
    Js(String),
}

impl StoreError {
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}
