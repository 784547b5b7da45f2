//! HTTP implementation of the remote service traits.

use async_trait::async_trait;
use domain::{AuthToken, CartItem, Money, OrderDraft, PlacedOrder, ProductId, UserRecord};
use serde::{Deserialize, Serialize};

use crate::auth::AuthApi;
use crate::cart::CartApi;
use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::orders::OrderApi;
use crate::payment::{GatewayOrder, PaymentApi, PaymentConfirmation};

#[derive(Debug, Deserialize)]
struct CartResponse {
    #[serde(default)]
    items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuantityUpdate<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductRef<'a> {
    product_id: &'a ProductId,
}

#[derive(Debug, Serialize)]
struct CreateGatewayOrderRequest {
    amount: Money,
}

#[derive(Debug, Deserialize)]
struct CreateGatewayOrderResponse {
    order: GatewayOrder,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Client for the real remote service over HTTP.
///
/// Implements every endpoint-family trait; bodies are JSON and
/// authenticated calls carry a bearer header.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    /// Creates a client against the configured base URL.
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a client configured from environment variables.
    pub fn from_env() -> Self {
        Self::new(RemoteConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    fn bearer(
        request: reqwest::RequestBuilder,
        token: Option<&AuthToken>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// Sends the request and maps non-success statuses to
    /// [`RemoteError::Status`].
    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CartApi for HttpRemote {
    #[tracing::instrument(skip(self, token))]
    async fn fetch_cart(&self, token: &AuthToken) -> Result<Vec<CartItem>> {
        let request = Self::bearer(self.client.get(self.url("/api/cart")), Some(token));
        let response = Self::send(request).await?;
        let body: CartResponse = response.json().await?;
        Ok(body.items)
    }

    #[tracing::instrument(skip(self, token, item), fields(product_id = %item.product_id))]
    async fn sync_item(&self, token: &AuthToken, item: &CartItem) -> Result<()> {
        let request =
            Self::bearer(self.client.post(self.url("/api/cart")), Some(token)).json(item);
        Self::send(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn update_quantity(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        let body = QuantityUpdate {
            product_id,
            quantity,
        };
        let request =
            Self::bearer(self.client.put(self.url("/api/cart")), Some(token)).json(&body);
        Self::send(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn remove_item(&self, token: &AuthToken, product_id: &ProductId) -> Result<()> {
        let body = ProductRef { product_id };
        let request =
            Self::bearer(self.client.delete(self.url("/api/cart")), Some(token)).json(&body);
        Self::send(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn clear(&self, token: &AuthToken) -> Result<()> {
        let request = Self::bearer(self.client.delete(self.url("/api/cart/clear")), Some(token));
        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentApi for HttpRemote {
    #[tracing::instrument(skip(self, token))]
    async fn create_gateway_order(
        &self,
        token: Option<&AuthToken>,
        amount: Money,
    ) -> Result<GatewayOrder> {
        let body = CreateGatewayOrderRequest { amount };
        let request = Self::bearer(
            self.client.post(self.url("/api/payment/create-order")),
            token,
        )
        .json(&body);
        let response = Self::send(request).await?;
        let body: CreateGatewayOrderResponse = response.json().await?;
        Ok(body.order)
    }

    #[tracing::instrument(skip(self, token, confirmation), fields(gateway_order_id = %confirmation.gateway_order_id))]
    async fn verify_payment(
        &self,
        token: Option<&AuthToken>,
        confirmation: &PaymentConfirmation,
    ) -> Result<()> {
        let request = Self::bearer(
            self.client.post(self.url("/api/payment/verify-payment")),
            token,
        )
        .json(confirmation);
        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderApi for HttpRemote {
    #[tracing::instrument(skip(self, token, draft), fields(total = %draft.total_amount))]
    async fn place_order(
        &self,
        token: Option<&AuthToken>,
        draft: &OrderDraft,
    ) -> Result<PlacedOrder> {
        let request = Self::bearer(self.client.post(self.url("/api/orders")), token).json(draft);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    #[tracing::instrument(skip(self, token))]
    async fn my_orders(&self, token: &AuthToken) -> Result<Vec<PlacedOrder>> {
        let request = Self::bearer(self.client.get(self.url("/api/orders/myorders")), Some(token));
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AuthApi for HttpRemote {
    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        let body = LoginRequest { email, password };
        let request = self.client.post(self.url("/api/auth/login")).json(&body);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    #[tracing::instrument(skip(self, password))]
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserRecord> {
        let body = RegisterRequest {
            name,
            email,
            password,
        };
        let request = self.client.post(self.url("/api/auth/register")).json(&body);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_update_wire_shape() {
        let pid = ProductId::new("p1");
        let body = QuantityUpdate {
            product_id: &pid,
            quantity: 4,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["quantity"], 4);
    }

    #[test]
    fn test_cart_response_defaults_to_empty() {
        let body: CartResponse = serde_json::from_str("{}").unwrap();
        assert!(body.items.is_empty());
    }

    #[test]
    fn test_create_order_response_shape() {
        let body: CreateGatewayOrderResponse = serde_json::from_str(
            r#"{"order":{"id":"order_1","amount":5000,"currency":"INR"}}"#,
        )
        .unwrap();
        assert_eq!(body.order.id, "order_1");
        assert_eq!(body.order.amount, Money::from_minor(5000));
    }
}
