use crate::entities::{
    OrderStatus, item_entity as items, order_entity as orders, order_item_entity as order_items,
    user_entity as users,
};
use crate::error::AppResult;
use crate::models::*;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

const TOP_PRODUCTS_LIMIT: u64 = 5;

/// Read-only admin reporting. Everything is recomputed on each call.
#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_dashboard(&self) -> AppResult<DashboardResponse> {
        let users_count = users::Entity::find().count(&self.pool).await?;
        let products_count = items::Entity::find().count(&self.pool).await?;
        let orders_count = orders::Entity::find().count(&self.pool).await?;

        Ok(DashboardResponse {
            users_count,
            products_count,
            orders_count,
            revenue: self.revenue().await?,
            orders_by_status: self.orders_by_status().await?,
            top_products: self.top_products().await?,
        })
    }

    async fn revenue(&self) -> AppResult<i64> {
        #[derive(Debug, FromQueryResult)]
        struct RevenueRow {
            revenue: Option<i64>,
        }

        // SUM(bigint) is NUMERIC on Postgres
        let row = orders::Entity::find()
            .select_only()
            .column_as(
                Expr::col(orders::Column::Total)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "revenue",
            )
            .into_model::<RevenueRow>()
            .one(&self.pool)
            .await?;

        Ok(row.and_then(|r| r.revenue).unwrap_or(0))
    }

    async fn orders_by_status(&self) -> AppResult<Vec<StatusCount>> {
        #[derive(Debug, FromQueryResult)]
        struct StatusRow {
            status: OrderStatus,
            count: i64,
        }

        let rows = orders::Entity::find()
            .select_only()
            .column(orders::Column::Status)
            .column_as(Expr::col(orders::Column::Id).count(), "count")
            .group_by(orders::Column::Status)
            .order_by_asc(orders::Column::Status)
            .into_model::<StatusRow>()
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect())
    }

    /// Best sellers by units across all order history; ties broken by item id.
    async fn top_products(&self) -> AppResult<Vec<TopProduct>> {
        #[derive(Debug, FromQueryResult)]
        struct SoldRow {
            item_id: Uuid,
            quantity: i64,
        }

        let sold = order_items::Entity::find()
            .select_only()
            .column(order_items::Column::ItemId)
            .column_as(
                Expr::col(order_items::Column::Quantity)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "quantity",
            )
            .group_by(order_items::Column::ItemId)
            .order_by(Expr::col(order_items::Column::Quantity).sum(), Order::Desc)
            .order_by(order_items::Column::ItemId, Order::Asc)
            .limit(TOP_PRODUCTS_LIMIT)
            .into_model::<SoldRow>()
            .all(&self.pool)
            .await?;

        if sold.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<Uuid, String> = items::Entity::find()
            .filter(items::Column::Id.is_in(sold.iter().map(|r| r.item_id)))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect();

        // referenced items are never hard-deleted, so a name is always found
        Ok(sold
            .into_iter()
            .filter_map(|row| {
                names.get(&row.item_id).map(|name| TopProduct {
                    id: row.item_id,
                    name: name.clone(),
                    quantity: row.quantity,
                })
            })
            .collect())
    }
}
