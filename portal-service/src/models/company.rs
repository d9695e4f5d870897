//! Company model.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "localizacao")]
    pub location: Option<String>,
}

impl Company {
    pub fn new(name: String, location: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            location,
        }
    }
}
