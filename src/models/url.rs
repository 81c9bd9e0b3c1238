use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored mapping between a short code and the URL it redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShortUrlRecord {
    pub original_url: String,
    pub short_code: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateShortUrlForm {
    #[serde(default)]
    pub url: String,
}
