//! API request/response models for keyed system configuration entries.

use crate::db::models::system_config::ConfigDBResponse;
use crate::errors::{Error, FieldIssue};
use crate::types::ConfigId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCreate {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

impl ConfigCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.key.trim().is_empty() {
            issues.push(FieldIssue::new("key", "must not be empty"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub value: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ConfigId,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigDBResponse> for ConfigResponse {
    fn from(db: ConfigDBResponse) -> Self {
        Self {
            id: db.id,
            key: db.key,
            value: db.value,
            description: db.description,
            updated_at: db.updated_at,
        }
    }
}
