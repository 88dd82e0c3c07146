use crate::utils::error::{BootstrapError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use std::env;

pub const SLACK_TOKEN_VAR: &str = "SLACK_TOKEN";
pub const SLACK_URL_VAR: &str = "SLACK_URL";
pub const COUCHDB_URL_VAR: &str = "COUCHDB_URL";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_token: String,
    pub slack_url: String,
    pub couchdb_url: String,
}

impl AppConfig {
    /// Reads the required environment variables. Presence is checked here,
    /// shape by `validate` before any network access is attempted.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            slack_token: required_var(SLACK_TOKEN_VAR)?,
            slack_url: required_var(SLACK_URL_VAR)?,
            couchdb_url: required_var(COUCHDB_URL_VAR)?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        BootstrapError::config(format!("Environment variable {} is not set.", name))
    })
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string(SLACK_TOKEN_VAR, &self.slack_token)?;
        validate_url(SLACK_URL_VAR, &self.slack_url)?;
        validate_url(COUCHDB_URL_VAR, &self.couchdb_url)?;
        Ok(())
    }
}
