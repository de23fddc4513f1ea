use std::path::Path;

use serde::Deserialize;

use super::credential::GOOGLE_TOKEN_URI;
use super::AuthError;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// OAuth client application secrets (the `credentials.json` downloaded
/// from the Google Cloud console).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let contents = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, AuthError> {
        let file: ClientSecretsFile =
            serde_json::from_str(contents).map_err(|source| AuthError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::InvalidSecrets(path.to_path_buf()))
    }
}
