use serde::{Deserialize, Serialize};

/// Which settings are present. Never carries the secret itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebugInfo {
    pub spotify_client_id_set: bool,
    pub spotify_client_secret_set: bool,
    pub redirect_uri: String,
    pub scopes: String,
}
