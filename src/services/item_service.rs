use crate::entities::{item_entity as items, order_item_entity as order_items};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{validate_name, validate_price};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ItemService {
    pool: DatabaseConnection,
}

impl ItemService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_items(&self, query: &ItemQuery) -> AppResult<Vec<ItemResponse>> {
        let mut select = items::Entity::find();
        if query.available == Some(true) {
            select = select.filter(items::Column::Available.eq(true));
        }

        let models = select
            .order_by_asc(items::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(ItemResponse::from).collect())
    }

    pub async fn get_item(&self, item_id: Uuid) -> AppResult<ItemResponse> {
        Ok(self.find_item(item_id).await?.into())
    }

    pub async fn create_item(&self, request: ItemRequest) -> AppResult<ItemResponse> {
        let request = validate_item(request)?;
        let now = Utc::now();

        let item = items::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            available: Set(request.available),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Item created: {} ({})", item.id, item.name);
        Ok(item.into())
    }

    /// Full replacement. Past order lines keep their own price snapshot.
    pub async fn update_item(&self, item_id: Uuid, request: ItemRequest) -> AppResult<ItemResponse> {
        let request = validate_item(request)?;

        let mut model = self.find_item(item_id).await?.into_active_model();
        model.name = Set(request.name);
        model.description = Set(request.description);
        model.price = Set(request.price);
        model.available = Set(request.available);
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Hard-deletes the item unless an order line references it, in which case it is
    /// only marked unavailable.
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<ItemDeletion> {
        let txn = self.pool.begin().await?;

        let item = items::Entity::find_by_id(item_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        let references = order_items::Entity::find()
            .filter(order_items::Column::ItemId.eq(item_id))
            .count(&txn)
            .await?;

        let outcome = if references > 0 {
            let mut model = item.into_active_model();
            model.available = Set(false);
            model.updated_at = Set(Utc::now());
            model.update(&txn).await?;
            ItemDeletion::MarkedUnavailable
        } else {
            items::Entity::delete_by_id(item_id).exec(&txn).await?;
            ItemDeletion::Deleted
        };

        txn.commit().await?;

        match outcome {
            ItemDeletion::Deleted => log::info!("Item {item_id} deleted"),
            ItemDeletion::MarkedUnavailable => log::info!(
                "Item {item_id} referenced by {references} order line(s), marked unavailable"
            ),
        }
        Ok(outcome)
    }

    async fn find_item(&self, item_id: Uuid) -> AppResult<items::Model> {
        items::Entity::find_by_id(item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }
}

fn validate_item(mut request: ItemRequest) -> AppResult<ItemRequest> {
    request.name = request.name.trim().to_string();
    validate_name(&request.name)?;
    validate_price(request.price)?;
    request.description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    Ok(request)
}
