use crate::entities::item_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_available() -> bool {
    true
}

/// Body for both create and full update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemRequest {
    #[schema(example = "Espresso beans 1kg")]
    pub name: String,
    pub description: Option<String>,
    /// Unit price in integer cents, must be positive.
    #[schema(example = 4990)]
    pub price: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemQuery {
    /// `true` restricts the listing to available items.
    pub available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in integer cents.
    #[schema(example = 4990)]
    pub price: i64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDeletion {
    Deleted,
    /// Item is referenced by past orders and was only marked unavailable.
    MarkedUnavailable,
}

impl From<item_entity::Model> for ItemResponse {
    fn from(m: item_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            available: m.available,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
