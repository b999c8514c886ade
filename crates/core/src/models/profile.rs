use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display data joined into projections. Profiles are owned by the identity
/// layer and are read-only to this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub sector_id: Option<Uuid>,
    pub observations: Option<String>,
    pub phone: Option<String>,
}
