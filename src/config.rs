//! Runtime settings loaded from the environment.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default base URL for the hosted activity index.
const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai";

/// Default managed index name.
const DEFAULT_INDEX_NAME: &str = "business_activity_intelligence";

/// Settings for a running assistant process.
///
/// Everything is read once at startup from `FZ_ASSIST_*` environment
/// variables; credentials are supplied out-of-band and never logged.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the managed vector index holding the activity knowledge base.
    pub index_name: String,
    /// Project the index lives under.
    pub project_name: String,
    /// Organization identifier for the hosted index service.
    pub organization_id: String,
    /// API key for the hosted index service.
    pub api_key: SecretString,
    /// Base URL of the hosted index service.
    pub base_url: String,
    /// Port for the web API (`serve` mode).
    pub port: u16,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// `FZ_ASSIST_ORG_ID` and `FZ_ASSIST_API_KEY` are required; everything
    /// else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let organization_id =
            std::env::var("FZ_ASSIST_ORG_ID").map_err(|_| ConfigError::MissingEnvVar {
                key: "FZ_ASSIST_ORG_ID".to_string(),
                hint: "Set it to your hosted index organization id".to_string(),
            })?;

        let api_key =
            std::env::var("FZ_ASSIST_API_KEY").map_err(|_| ConfigError::MissingEnvVar {
                key: "FZ_ASSIST_API_KEY".to_string(),
                hint: "Set it to your hosted index API key".to_string(),
            })?;

        let index_name = std::env::var("FZ_ASSIST_INDEX_NAME")
            .unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string());

        let project_name =
            std::env::var("FZ_ASSIST_PROJECT").unwrap_or_else(|_| "Default".to_string());

        let base_url =
            std::env::var("FZ_ASSIST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let port = match std::env::var("FZ_ASSIST_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "FZ_ASSIST_PORT".to_string(),
                message: format!("'{raw}' is not a valid port number"),
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            index_name,
            project_name,
            organization_id,
            api_key: SecretString::from(api_key),
            base_url,
            port,
        })
    }
}
