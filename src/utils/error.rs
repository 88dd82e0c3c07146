use thiserror::Error;

/// Failures returned by the backing document store.
///
/// `NotFound` and `Conflict` are part of normal control flow (missing
/// database, missing document, concurrent insert); everything else means
/// the store is unreachable or misbehaving.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("document update conflict")]
    Conflict,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed response from store: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response from store: HTTP {status}")]
    Unexpected { status: u16 },
}

/// Fatal bootstrap failures. Non-fatal conditions (a skipped invalid
/// record, a failed persist-back of a default document) are logged where
/// they occur and never reach this type.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Configuration error. {message}")]
    ConfigError { message: String },

    #[error("cannot provision database \"{database}\": {message}")]
    ProvisionError { database: String, message: String },

    #[error("{message}")]
    LoadError { message: String },
}

impl BootstrapError {
    pub fn config(message: impl Into<String>) -> Self {
        BootstrapError::ConfigError {
            message: message.into(),
        }
    }

    pub fn provision(database: impl Into<String>, message: impl Into<String>) -> Self {
        BootstrapError::ProvisionError {
            database: database.into(),
            message: message.into(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        BootstrapError::LoadError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;
