use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::client::{Action, SessionStore};
use crate::entities::OrderStatus;
use crate::models::*;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Cart is empty")]
    EmptyCart,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Thin wrapper over the REST API. Session state lives in [`SessionStore`]; calls that
/// need a token read it from there.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserResponse> {
        let builder = self.client.post(self.url("/auth/register")).json(request);
        read_json(builder.send().await?).await
    }

    /// Logs in and records the session in `store`.
    pub async fn login(
        &self,
        store: &mut SessionStore,
        request: &LoginRequest,
    ) -> ClientResult<AuthResponse> {
        let builder = self.client.post(self.url("/auth/login")).json(request);
        let response: AuthResponse = read_json(builder.send().await?).await?;

        record(
            store,
            Action::SignedIn {
                token: response.token.clone(),
                user: response.user.clone(),
            },
        );
        Ok(response)
    }

    pub fn logout(&self, store: &mut SessionStore) {
        record(store, Action::SignedOut);
    }

    pub async fn list_items(&self, only_available: bool) -> ClientResult<Vec<ItemResponse>> {
        let mut builder = self.client.get(self.url("/items"));
        if only_available {
            builder = builder.query(&[("available", "true")]);
        }
        read_json(builder.send().await?).await
    }

    pub async fn get_item(&self, item_id: Uuid) -> ClientResult<ItemResponse> {
        let builder = self.client.get(self.url(&format!("/items/{item_id}")));
        read_json(builder.send().await?).await
    }

    /// Places an order for the cart contents. The cart is cleared only on success.
    pub async fn checkout(&self, store: &mut SessionStore) -> ClientResult<OrderResponse> {
        if store.cart().is_empty() {
            return Err(ClientError::EmptyCart);
        }
        let body = store.cart().to_order_request();
        let order: OrderResponse = self.send(store, Method::POST, "/orders", Some(&body)).await?;

        record(store, Action::ClearCart);
        Ok(order)
    }

    pub async fn my_orders(&self, store: &SessionStore) -> ClientResult<Vec<OrderResponse>> {
        self.send::<(), _>(store, Method::GET, "/orders/my-orders", None)
            .await
    }

    pub async fn get_order(&self, store: &SessionStore, order_id: Uuid) -> ClientResult<OrderResponse> {
        self.send::<(), _>(store, Method::GET, &format!("/orders/{order_id}"), None)
            .await
    }

    pub async fn me(&self, store: &SessionStore) -> ClientResult<UserResponse> {
        self.send::<(), _>(store, Method::GET, "/users/me", None).await
    }

    pub async fn create_item(
        &self,
        store: &SessionStore,
        request: &ItemRequest,
    ) -> ClientResult<ItemResponse> {
        self.send(store, Method::POST, "/items", Some(request)).await
    }

    pub async fn update_item(
        &self,
        store: &SessionStore,
        item_id: Uuid,
        request: &ItemRequest,
    ) -> ClientResult<ItemResponse> {
        self.send(store, Method::PUT, &format!("/items/{item_id}"), Some(request))
            .await
    }

    /// Returns the outcome reported by the server: 204 for a removal, 200 when the item
    /// was only marked unavailable.
    pub async fn delete_item(&self, store: &SessionStore, item_id: Uuid) -> ClientResult<ItemDeletion> {
        let response = self
            .authorized(store, Method::DELETE, &format!("/items/{item_id}"))?
            .send()
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(ItemDeletion::Deleted),
            status if status.is_success() => Ok(ItemDeletion::MarkedUnavailable),
            _ => Err(api_error(response).await),
        }
    }

    pub async fn list_orders(
        &self,
        store: &SessionStore,
        status: Option<OrderStatus>,
    ) -> ClientResult<Vec<OrderResponse>> {
        let mut builder = self.authorized(store, Method::GET, "/orders")?;
        if let Some(status) = status {
            builder = builder.query(&[("status", status.to_string())]);
        }
        read_json(builder.send().await?).await
    }

    pub async fn update_order_status(
        &self,
        store: &SessionStore,
        order_id: Uuid,
        status: OrderStatus,
    ) -> ClientResult<OrderResponse> {
        let body = UpdateOrderStatusRequest { status };
        self.send(
            store,
            Method::PATCH,
            &format!("/orders/{order_id}/status"),
            Some(&body),
        )
        .await
    }

    pub async fn list_users(&self, store: &SessionStore) -> ClientResult<Vec<UserResponse>> {
        self.send::<(), _>(store, Method::GET, "/users", None).await
    }

    pub async fn dashboard(&self, store: &SessionStore) -> ClientResult<DashboardResponse> {
        self.send::<(), _>(store, Method::GET, "/admin/dashboard", None)
            .await
    }

    fn authorized(
        &self,
        store: &SessionStore,
        method: Method,
        path: &str,
    ) -> ClientResult<RequestBuilder> {
        let token = store.token().ok_or(ClientError::NotSignedIn)?;
        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    async fn send<B, T>(
        &self,
        store: &SessionStore,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.authorized(store, method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        read_json(builder.send().await?).await
    }
}

/// Applies a session or clear-cart action. Only cart edits can return `CartError`, so a
/// failure here is logged rather than propagated.
fn record(store: &mut SessionStore, action: Action) {
    if let Err(e) = store.dispatch(action) {
        log::warn!("Session update rejected: {e}");
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response.json().await?)
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<MessageResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    };
    ClientError::Api { status, message }
}
