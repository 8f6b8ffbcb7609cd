//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// `limit` / `offset` query parameters.
///
/// Uses `serde_with` to parse numbers from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListParams {
    /// Resolves parameters to `(limit, offset)`.
    ///
    /// # Defaults
    ///
    /// - `limit`: 10, also used when the value is outside `1..=100`
    /// - `offset`: 0, negative values are treated as 0
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = self
            .limit
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);

        (limit, offset)
    }
}
