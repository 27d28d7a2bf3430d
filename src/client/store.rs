use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateOrderRequest, ItemResponse, OrderLineRequest, UserResponse};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CartError {
    #[error("Item is not available: {0}")]
    Unavailable(Uuid),

    #[error("Item is not in the cart: {0}")]
    NotInCart(Uuid),

    #[error("Quantity must be positive")]
    InvalidQuantity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: ItemResponse,
    pub quantity: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> i64 {
        self.item.price.saturating_mul(i64::from(self.quantity))
    }
}

/// Lines keep insertion order; an item appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Total in cents, at the prices the items had when they were added.
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .map(CartLine::subtotal)
            .fold(0, i64::saturating_add)
    }

    pub fn to_order_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            items: self
                .lines
                .iter()
                .map(|line| OrderLineRequest {
                    item_id: line.item.id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    fn add(&mut self, item: ItemResponse, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !item.available {
            return Err(CartError::Unavailable(item.id));
        }

        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity)?
            }
            None => self.lines.push(CartLine { item, quantity }),
        }
        Ok(())
    }

    fn set_quantity(&mut self, item_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity == 0 {
            return self.remove(item_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.item.id == item_id)
            .ok_or(CartError::NotInCart(item_id))?;
        line.quantity = quantity;
        Ok(())
    }

    fn remove(&mut self, item_id: Uuid) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.item.id != item_id);
        if self.lines.len() == before {
            return Err(CartError::NotInCart(item_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SignedIn { token: String, user: UserResponse },
    SignedOut,
    AddToCart { item: ItemResponse, quantity: i32 },
    SetQuantity { item_id: Uuid, quantity: i32 },
    RemoveFromCart(Uuid),
    ClearCart,
}

/// Session of one frontend user. All mutation goes through [`SessionStore::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    token: Option<String>,
    current_user: Option<UserResponse>,
    cart: Cart,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&UserResponse> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| user.role.is_admin())
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), CartError> {
        match action {
            Action::SignedIn { token, user } => {
                self.token = Some(token);
                self.current_user = Some(user);
            }
            Action::SignedOut => {
                self.token = None;
                self.current_user = None;
                self.cart = Cart::default();
            }
            Action::AddToCart { item, quantity } => self.cart.add(item, quantity)?,
            Action::SetQuantity { item_id, quantity } => {
                self.cart.set_quantity(item_id, quantity)?
            }
            Action::RemoveFromCart(item_id) => self.cart.remove(item_id)?,
            Action::ClearCart => self.cart = Cart::default(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;
    use chrono::Utc;

    fn item(price: i64, available: bool) -> ItemResponse {
        ItemResponse {
            id: Uuid::new_v4(),
            name: "Coffee".to_string(),
            description: None,
            price,
            available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(role: Role) -> UserResponse {
        UserResponse {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_same_item_increments_quantity() {
        let mut store = SessionStore::new();
        let coffee = item(250, true);

        store
            .dispatch(Action::AddToCart { item: coffee.clone(), quantity: 1 })
            .unwrap();
        store
            .dispatch(Action::AddToCart { item: coffee.clone(), quantity: 2 })
            .unwrap();

        assert_eq!(store.cart().lines().len(), 1);
        assert_eq!(store.cart().lines()[0].quantity, 3);
        assert_eq!(store.cart().total(), 750);
    }

    #[test]
    fn test_total_and_order_request() {
        let mut store = SessionStore::new();
        let coffee = item(250, true);
        let cake = item(400, true);

        store
            .dispatch(Action::AddToCart { item: coffee.clone(), quantity: 2 })
            .unwrap();
        store
            .dispatch(Action::AddToCart { item: cake.clone(), quantity: 1 })
            .unwrap();

        assert_eq!(store.cart().total(), 900);
        assert_eq!(store.cart().item_count(), 3);

        let request = store.cart().to_order_request();
        assert_eq!(
            request.items,
            vec![
                OrderLineRequest { item_id: coffee.id, quantity: 2 },
                OrderLineRequest { item_id: cake.id, quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut store = SessionStore::new();
        let coffee = item(250, true);
        store
            .dispatch(Action::AddToCart { item: coffee.clone(), quantity: 2 })
            .unwrap();

        store
            .dispatch(Action::SetQuantity { item_id: coffee.id, quantity: 5 })
            .unwrap();
        assert_eq!(store.cart().lines()[0].quantity, 5);

        store
            .dispatch(Action::SetQuantity { item_id: coffee.id, quantity: 0 })
            .unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_invalid_cart_actions() {
        let mut store = SessionStore::new();
        let sold_out = item(100, false);
        let unknown = Uuid::new_v4();

        assert_eq!(
            store.dispatch(Action::AddToCart { item: sold_out.clone(), quantity: 1 }),
            Err(CartError::Unavailable(sold_out.id))
        );
        assert_eq!(
            store.dispatch(Action::AddToCart { item: item(100, true), quantity: 0 }),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(
            store.dispatch(Action::RemoveFromCart(unknown)),
            Err(CartError::NotInCart(unknown))
        );
        assert_eq!(
            store.dispatch(Action::SetQuantity { item_id: unknown, quantity: -1 }),
            Err(CartError::InvalidQuantity)
        );
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let mut store = SessionStore::new();
        let coffee = item(1, true);
        store
            .dispatch(Action::AddToCart { item: coffee.clone(), quantity: i32::MAX })
            .unwrap();

        assert_eq!(
            store.dispatch(Action::AddToCart { item: coffee.clone(), quantity: 1 }),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(store.cart().lines()[0].quantity, i32::MAX);

        store
            .dispatch(Action::AddToCart { item: item(1, true), quantity: i32::MAX })
            .unwrap();
        assert_eq!(store.cart().item_count(), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut store = SessionStore::new();
        assert!(!store.is_authenticated());

        store
            .dispatch(Action::SignedIn { token: "t".to_string(), user: user(Role::Admin) })
            .unwrap();
        store
            .dispatch(Action::AddToCart { item: item(250, true), quantity: 1 })
            .unwrap();
        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert_eq!(store.token(), Some("t"));

        store.dispatch(Action::SignedOut).unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(store.current_user().is_none());
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_clear_cart_keeps_session() {
        let mut store = SessionStore::new();
        store
            .dispatch(Action::SignedIn { token: "t".to_string(), user: user(Role::User) })
            .unwrap();
        store
            .dispatch(Action::AddToCart { item: item(250, true), quantity: 1 })
            .unwrap();

        store.dispatch(Action::ClearCart).unwrap();

        assert!(store.cart().is_empty());
        assert!(store.is_authenticated());
        assert!(!store.is_admin());
    }
}
