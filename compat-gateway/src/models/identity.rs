use serde::{Deserialize, Serialize};

/// Bearer token accepted as the universal credential in development mode
pub const EMULATOR_TOKEN: &str = "emulator-token";

/// Decoded caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Fixed identity behind `EMULATOR_TOKEN`
    pub fn emulator() -> Self {
        Self {
            uid: "emulator-user".to_string(),
            email: Some("emulator@local".to_string()),
        }
    }
}
