use crate::entities::{OrderStatus, order_entity, order_item_entity};
use crate::models::{ItemResponse, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub item_id: Uuid,
    #[schema(example = 1)]
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    /// Unrecognised values are ignored.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    /// Unit price in integer cents, captured at checkout.
    #[schema(example = 1250)]
    pub price: i64,
    pub item: ItemResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Order total in integer cents.
    #[schema(example = 3300)]
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<UserSummary>,
}

impl OrderResponse {
    pub fn new(order: order_entity::Model, items: Vec<OrderItemResponse>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            items,
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserSummary) -> Self {
        self.user = Some(user);
        self
    }
}

impl OrderItemResponse {
    pub fn new(line: order_item_entity::Model, item: ItemResponse) -> Self {
        Self {
            id: line.id,
            order_id: line.order_id,
            item_id: line.item_id,
            quantity: line.quantity,
            price: line.price,
            item,
        }
    }
}
