use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    /// Display initials shown on the doctor's avatar.
    pub initials: String,
    /// Hashed 4-digit access PIN. Never serialized outward.
    #[serde(skip_serializing, default)]
    pub pin_hash: Option<String>,
}

impl Doctor {
    /// Whether a PIN gate is configured for this doctor's dashboard.
    pub fn has_pin(&self) -> bool {
        self.pin_hash.is_some()
    }
}
