//! Client configuration.
//!
//! Read from the environment by default:
//! - `FINOLOG_API_TOKEN` (required)
//! - `FINOLOG_BIZ_ID` (required, integer)
//! - `FINOLOG_BASE_URL` (optional, defaults to the production v1 API)

use crate::api::BASE_URL;
use crate::error::ApiError;

pub const TOKEN_VAR: &str = "FINOLOG_API_TOKEN";
pub const BIZ_ID_VAR: &str = "FINOLOG_BIZ_ID";
pub const BASE_URL_VAR: &str = "FINOLOG_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_token: String,
    pub biz_id: i64,
    pub base_url: String,
}

impl Config {
    pub fn new(api_token: impl Into<String>, biz_id: i64) -> Self {
        Self {
            api_token: api_token.into(),
            biz_id,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_token = lookup(TOKEN_VAR).ok_or_else(|| ApiError::Config(format!("{TOKEN_VAR} is not set")))?;
        let raw_biz_id = lookup(BIZ_ID_VAR).ok_or_else(|| ApiError::Config(format!("{BIZ_ID_VAR} is not set")))?;
        let biz_id = parse_id("biz_id", &raw_biz_id)?;
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| BASE_URL.to_string());
        Ok(Self {
            api_token,
            biz_id,
            base_url,
        })
    }
}

/// Parse an identifier supplied as text.
pub fn parse_id(field: &str, raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::InvalidId {
        field: field.to_string(),
        value: raw.to_string(),
    })
}
