use crate::entities::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    /// Units sold across all orders.
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub users_count: u64,
    pub products_count: u64,
    pub orders_count: u64,
    /// Sum of all order totals in integer cents.
    pub revenue: i64,
    pub orders_by_status: Vec<StatusCount>,
    pub top_products: Vec<TopProduct>,
}
