// Contact models - submissions from the public contact form
// Table: contacts (no owner column)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: String,
    pub naam: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrijf: Option<String>,
    pub bericht: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInput {
    pub naam: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrijf: Option<String>,
    pub bericht: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactList {
    pub data: Vec<ContactDto>,
    pub total: u64,
}
