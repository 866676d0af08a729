use thiserror::Error;

use crate::model::{ItemId, RecipeId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Upstream API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("endpoint {endpoint} requires an API key")]
    MissingApiKey { endpoint: &'static str },
}

impl ApiError {
    /// Whether this error is a 4xx client error (not worth retrying).
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => status.is_client_error(),
            ApiError::Http(e) => e.status().is_some_and(|s| s.is_client_error()),
            ApiError::MissingApiKey { .. } => true,
        }
    }

    /// Whether this error is a 404 (tolerated on bulk fetches).
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            ApiError::Http(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            ApiError::MissingApiKey { .. } => false,
        }
    }
}

/// On-disk catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("key {key} already present in catalog")]
    DuplicateKey { key: String },

    #[error("corrupt index entry at byte {offset} of {file}")]
    CorruptIndex { file: String, offset: u64 },

    #[error("cache is empty and offline mode is on")]
    OfflineEmpty,
}

/// Name and id resolution errors.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("item name {name:?} matches {} items: {}", candidates.len(), format_candidates(candidates))]
    AmbiguousName {
        name: String,
        candidates: Vec<ItemId>,
    },

    #[error("no item named {name:?}")]
    UnknownName { name: String },

    #[error("unknown item id {0}")]
    UnknownItem(ItemId),

    #[error("unknown recipe id {0}")]
    UnknownRecipe(RecipeId),
}

fn format_candidates(candidates: &[ItemId]) -> String {
    let ids: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    ids.join(", ")
}

/// Planning failures. These indicate bad recipe data or an engine bug,
/// not user error.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(
        "strategy for item {item} failed its post-condition: \
         inventory {have} still below floor {floor}"
    )]
    StrategyPostcondition { item: ItemId, have: i64, floor: i64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Api(ApiError::Http(err))
    }
}
