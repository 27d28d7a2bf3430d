use crate::entities::{
    OrderStatus, Role, item_entity as items, order_entity as orders,
    order_item_entity as order_items, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One request line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
}

/// Shape checks that need no catalog: non-empty, positive quantities, each item at most
/// once.
pub fn validate_lines(lines: &[OrderLineRequest]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::ValidationError(
            "Order must contain at least one item".to_string(),
        ));
    }
    if lines.iter().any(|line| line.quantity <= 0) {
        return Err(AppError::ValidationError(
            "Quantity must be a positive integer".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(lines.len());
    if !lines.iter().all(|line| seen.insert(line.item_id)) {
        return Err(AppError::ValidationError(
            "Each item may appear only once per order".to_string(),
        ));
    }
    Ok(())
}

/// Resolves every line against `prices` (item id to current unit price, available
/// items only) and returns the lines with the order total. Any unknown item fails
/// the whole order.
pub fn price_order(
    lines: &[OrderLineRequest],
    prices: &HashMap<Uuid, i64>,
) -> AppResult<(Vec<PricedLine>, i64)> {
    validate_lines(lines)?;

    let mut total: i64 = 0;
    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        let unit_price = *prices.get(&line.item_id).ok_or_else(|| {
            AppError::ValidationError(
                "One or more items do not exist or are unavailable".to_string(),
            )
        })?;

        total = unit_price
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| AppError::ValidationError("Order total is too large".to_string()))?;

        priced.push(PricedLine {
            item_id: line.item_id,
            quantity: line.quantity,
            unit_price,
        });
    }

    Ok((priced, total))
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    enforce_status_transitions: bool,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, enforce_status_transitions: bool) -> Self {
        Self {
            pool,
            enforce_status_transitions,
        }
    }

    /// Checkout.
    ///
    /// The availability check and the inserts share one transaction; item rows are read
    /// with a shared lock so they cannot be soft-deleted or repriced in between.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        validate_lines(&request.items)?;

        let item_ids: Vec<Uuid> = request
            .items
            .iter()
            .map(|line| line.item_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let txn = self.pool.begin().await?;

        let catalog = items::Entity::find()
            .filter(items::Column::Id.is_in(item_ids))
            .filter(items::Column::Available.eq(true))
            .lock_shared()
            .all(&txn)
            .await?;
        let prices: HashMap<Uuid, i64> = catalog.iter().map(|i| (i.id, i.price)).collect();

        // dropping `txn` on error rolls back
        let (lines, total) = price_order(&request.items, &prices)?;

        let now = Utc::now();
        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total: Set(total),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let rows: Vec<order_items::ActiveModel> = lines
            .iter()
            .enumerate()
            .map(|(position, line)| order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                item_id: Set(line.item_id),
                position: Set(position as i32),
                quantity: Set(line.quantity),
                price: Set(line.unit_price),
            })
            .collect();
        order_items::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "Order {} created for user {} with {} line(s), total {}",
            order.id,
            user_id,
            lines.len(),
            total
        );

        let mut details = load_order_details(&self.pool, vec![order], false).await?;
        details
            .pop()
            .ok_or_else(|| AppError::InternalError("Created order vanished".to_string()))
    }

    /// Orders placed by `user_id`, newest first.
    pub async fn get_user_orders(&self, user_id: Uuid) -> AppResult<Vec<OrderResponse>> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        load_order_details(&self.pool, models, false).await
    }

    /// Admins may read any order; users only their own. A foreign order yields
    /// `Forbidden`, never the body.
    pub async fn get_order(&self, order_id: Uuid, caller: &AuthUser) -> AppResult<OrderResponse> {
        let order = self.find_order(order_id).await?;

        match caller.role {
            Role::Admin => {}
            Role::User if order.user_id == caller.id => {}
            Role::User => {
                return Err(AppError::Forbidden(
                    "You are not allowed to view this order".to_string(),
                ));
            }
        }

        self.single_with_user(order).await
    }

    /// Every order, optionally narrowed to one status, newest first.
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> AppResult<Vec<OrderResponse>> {
        let mut select = orders::Entity::find();
        if let Some(status) = status {
            select = select.filter(orders::Column::Status.eq(status));
        }

        let models = select
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        load_order_details(&self.pool, models, true).await
    }

    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> AppResult<OrderResponse> {
        let order = self.find_order(order_id).await?;
        let current = order.status;

        if self.enforce_status_transitions && !current.can_transition_to(status) {
            return Err(AppError::ValidationError(format!(
                "Cannot change order status from {current} to {status}"
            )));
        }

        let mut model = order.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;

        log::info!("Order {order_id} status changed: {current} -> {status}");

        self.single_with_user(updated).await
    }

    async fn find_order(&self, order_id: Uuid) -> AppResult<orders::Model> {
        orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    async fn single_with_user(&self, order: orders::Model) -> AppResult<OrderResponse> {
        load_order_details(&self.pool, vec![order], true)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Order details missing".to_string()))
    }
}

/// Batch-loads lines, catalog items and (optionally) owners for `models`, keeping the
/// input order.
async fn load_order_details<C: ConnectionTrait>(
    conn: &C,
    models: Vec<orders::Model>,
    with_user: bool,
) -> AppResult<Vec<OrderResponse>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = models.iter().map(|o| o.id).collect();
    let lines = order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_items::Column::Position)
        .all(conn)
        .await?;

    let item_ids: HashSet<Uuid> = lines.iter().map(|l| l.item_id).collect();
    let catalog: HashMap<Uuid, ItemResponse> = items::Entity::find()
        .filter(items::Column::Id.is_in(item_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| (i.id, ItemResponse::from(i)))
        .collect();

    let owners: HashMap<Uuid, UserSummary> = if with_user {
        let user_ids: HashSet<Uuid> = models.iter().map(|o| o.user_id).collect();
        users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect()
    } else {
        HashMap::new()
    };

    let mut lines_by_order: HashMap<Uuid, Vec<OrderItemResponse>> = HashMap::new();
    for line in lines {
        // RESTRICT on order_items.item_id keeps referenced items alive
        let item = catalog.get(&line.item_id).cloned().ok_or_else(|| {
            AppError::InternalError(format!("Order line references missing item {}", line.item_id))
        })?;
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderItemResponse::new(line, item));
    }

    Ok(models
        .into_iter()
        .map(|order| {
            let user = owners.get(&order.user_id).cloned();
            let lines = lines_by_order.remove(&order.id).unwrap_or_default();
            let response = OrderResponse::new(order, lines);
            match user {
                Some(user) => response.with_user(user),
                None => response,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ItemService;
    use crate::services::test_support::*;
    use sea_orm::PaginatorTrait;

    fn line(item_id: Uuid, quantity: i32) -> OrderLineRequest {
        OrderLineRequest { item_id, quantity }
    }

    fn caller(user: &users::Model) -> AuthUser {
        AuthUser {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }

    #[test]
    fn test_price_order_sums_lines() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let prices = HashMap::from([(a, 250), (b, 1000)]);

        let (lines, total) = price_order(&[line(a, 3), line(b, 1)], &prices).unwrap();
        assert_eq!(total, 3 * 250 + 1000);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].unit_price, 1000);
    }

    #[test]
    fn test_price_order_rejects_bad_input() {
        let a = Uuid::new_v4();
        let prices = HashMap::from([(a, 250)]);

        assert!(price_order(&[], &prices).is_err());
        assert!(price_order(&[line(a, 0)], &prices).is_err());
        assert!(price_order(&[line(a, -2)], &prices).is_err());
        assert!(price_order(&[line(a, 1), line(Uuid::new_v4(), 1)], &prices).is_err());
        assert!(price_order(&[line(a, 1), line(a, 2)], &prices).is_err());
    }

    #[test]
    fn test_price_order_overflow_is_rejected() {
        let a = Uuid::new_v4();
        let prices = HashMap::from([(a, i64::MAX / 2)]);
        let err = price_order(&[line(a, 3)], &prices).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn test_create_order_snapshots_prices() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let user = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 1250, true).await;
        let mug = seed_item(&pool, "Mug", 800, true).await;

        let order = svc
            .create_order(
                user.id,
                CreateOrderRequest {
                    items: vec![line(coffee.id, 2), line(mug.id, 1)],
                },
            )
            .await
            .unwrap();

        assert_eq!(order.total, 2 * 1250 + 800);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, user.id);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].item_id, coffee.id);
        assert_eq!(order.items[0].price, 1250);
        assert_eq!(order.items[1].item.name, "Mug");

        // repricing the item leaves the order untouched
        ItemService::new(pool.clone())
            .update_item(
                coffee.id,
                ItemRequest {
                    name: "Coffee".to_string(),
                    description: None,
                    price: 9999,
                    available: true,
                },
            )
            .await
            .unwrap();

        let reread = svc.get_order(order.id, &caller(&user)).await.unwrap();
        assert_eq!(reread.total, 2 * 1250 + 800);
        assert_eq!(reread.items[0].price, 1250);
        assert_eq!(reread.items[0].item.price, 9999);
        let recomputed: i64 = reread
            .items
            .iter()
            .map(|l| l.price * i64::from(l.quantity))
            .sum();
        assert_eq!(recomputed, reread.total);
    }

    #[actix_web::test]
    async fn test_create_order_is_all_or_nothing() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let user = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 1250, true).await;
        let retired = seed_item(&pool, "Retired", 100, false).await;

        for bad in [retired.id, Uuid::new_v4()] {
            let err = svc
                .create_order(
                    user.id,
                    CreateOrderRequest {
                        items: vec![line(coffee.id, 1), line(bad, 1)],
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let err = svc
            .create_order(user.id, CreateOrderRequest { items: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert_eq!(orders::Entity::find().count(&pool).await.unwrap(), 0);
        assert_eq!(order_items::Entity::find().count(&pool).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_repeated_item_is_rejected() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let user = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 300, true).await;

        let err = svc
            .create_order(
                user.id,
                CreateOrderRequest {
                    items: vec![line(coffee.id, 1), line(coffee.id, 2)],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert_eq!(orders::Entity::find().count(&pool).await.unwrap(), 0);
        assert_eq!(order_items::Entity::find().count(&pool).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_get_order_ownership() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let bob = seed_user(&pool, "Bob Lima", "bob@x.com", Role::User).await;
        let admin = seed_user(&pool, "Admin", "admin@x.com", Role::Admin).await;
        let coffee = seed_item(&pool, "Coffee", 300, true).await;
        let order = seed_order(&pool, ana.id, &[(coffee.id, 1, 300)], OrderStatus::Pending).await;

        let own = svc.get_order(order.id, &caller(&ana)).await.unwrap();
        assert_eq!(own.user.as_ref().map(|u| u.id), Some(ana.id));

        let err = svc.get_order(order.id, &caller(&bob)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(svc.get_order(order.id, &caller(&admin)).await.is_ok());

        let err = svc
            .get_order(Uuid::new_v4(), &caller(&bob))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_list_orders_filters_by_status_and_owner() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let bob = seed_user(&pool, "Bob Lima", "bob@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 300, true).await;
        seed_order(&pool, ana.id, &[(coffee.id, 1, 300)], OrderStatus::Pending).await;
        seed_order(&pool, ana.id, &[(coffee.id, 2, 300)], OrderStatus::Completed).await;
        seed_order(&pool, bob.id, &[(coffee.id, 3, 300)], OrderStatus::Pending).await;

        assert_eq!(svc.list_orders(None).await.unwrap().len(), 3);
        let pending = svc.list_orders(Some(OrderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|o| o.user.is_some()));

        let mine = svc.get_user_orders(ana.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == ana.id && o.user.is_none()));
    }

    #[actix_web::test]
    async fn test_update_status_is_unconstrained_by_default() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), false);
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 300, true).await;
        let order =
            seed_order(&pool, ana.id, &[(coffee.id, 1, 300)], OrderStatus::Completed).await;

        let updated = svc
            .update_status(order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Pending);
        assert_eq!(updated.user.map(|u| u.id), Some(ana.id));

        let err = svc
            .update_status(Uuid::new_v4(), OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_update_status_enforced_lifecycle() {
        let pool = test_pool().await;
        let svc = OrderService::new(pool.clone(), true);
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let coffee = seed_item(&pool, "Coffee", 300, true).await;
        let order = seed_order(&pool, ana.id, &[(coffee.id, 1, 300)], OrderStatus::Pending).await;

        svc.update_status(order.id, OrderStatus::Processing)
            .await
            .unwrap();
        svc.update_status(order.id, OrderStatus::Completed)
            .await
            .unwrap();
        let err = svc
            .update_status(order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
