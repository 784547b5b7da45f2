//! Remote payment endpoints: trait, wire types, and in-memory
//! implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{AuthToken, Money};
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

/// A gateway order handle minted by the remote service.
///
/// Opaque to the client beyond the fields needed to open the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order identifier.
    pub id: String,

    /// Amount to collect, in minor units.
    pub amount: Money,

    /// ISO currency code.
    pub currency: String,
}

/// The signed confirmation the gateway delivers on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    /// The gateway order this confirmation belongs to.
    #[serde(rename = "orderId")]
    pub gateway_order_id: String,

    /// Gateway payment identifier; becomes the order's transaction ref.
    pub payment_id: String,

    /// Signature over the order/payment pair, verified server-side.
    pub signature: String,
}

/// Operations against the remote payment endpoints.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Asks the service to create a gateway order for `amount`.
    async fn create_gateway_order(
        &self,
        token: Option<&AuthToken>,
        amount: Money,
    ) -> Result<GatewayOrder>;

    /// Submits a confirmation triple for server-side signature verification.
    async fn verify_payment(
        &self,
        token: Option<&AuthToken>,
        confirmation: &PaymentConfirmation,
    ) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    orders: Vec<GatewayOrder>,
    verified: Vec<PaymentConfirmation>,
    next_id: u32,
    fail_on_create: bool,
    fail_on_verify: bool,
}

/// In-memory payment service for testing.
///
/// Mints sequential gateway orders and verifies signatures against a fixed
/// test secret, standing in for the HMAC check the real backend performs.
#[derive(Debug, Clone)]
pub struct InMemoryPaymentApi {
    secret: String,
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl Default for InMemoryPaymentApi {
    fn default() -> Self {
        Self {
            secret: "test-secret".to_string(),
            state: Arc::default(),
        }
    }
}

impl InMemoryPaymentApi {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail order creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the service to reject every verification.
    pub fn set_fail_on_verify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_verify = fail;
    }

    /// The signature the service expects for an order/payment pair.
    pub fn signature_for(&self, gateway_order_id: &str, payment_id: &str) -> String {
        format!("{gateway_order_id}|{payment_id}|{}", self.secret)
    }

    /// Returns the number of gateway orders created.
    pub fn created_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns the number of confirmations verified.
    pub fn verified_count(&self) -> usize {
        self.state.read().unwrap().verified.len()
    }

    /// Returns the most recently created gateway order, if any.
    pub fn last_order(&self) -> Option<GatewayOrder> {
        self.state.read().unwrap().orders.last().cloned()
    }
}

#[async_trait]
impl PaymentApi for InMemoryPaymentApi {
    async fn create_gateway_order(
        &self,
        _token: Option<&AuthToken>,
        amount: Money,
    ) -> Result<GatewayOrder> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(RemoteError::Status {
                status: 502,
                message: "gateway order creation failed".to_string(),
            });
        }

        state.next_id += 1;
        let order = GatewayOrder {
            id: format!("order_{:04}", state.next_id),
            amount,
            currency: "INR".to_string(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn verify_payment(
        &self,
        _token: Option<&AuthToken>,
        confirmation: &PaymentConfirmation,
    ) -> Result<()> {
        let expected =
            self.signature_for(&confirmation.gateway_order_id, &confirmation.payment_id);

        let mut state = self.state.write().unwrap();

        let known_order = state
            .orders
            .iter()
            .any(|o| o.id == confirmation.gateway_order_id);

        if state.fail_on_verify || !known_order || confirmation.signature != expected {
            return Err(RemoteError::Status {
                status: 400,
                message: "signature verification failed".to_string(),
            });
        }

        state.verified.push(confirmation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_verify() {
        let api = InMemoryPaymentApi::new();
        let order = api
            .create_gateway_order(None, Money::from_minor(5000))
            .await
            .unwrap();
        assert_eq!(order.id, "order_0001");
        assert_eq!(order.currency, "INR");

        let confirmation = PaymentConfirmation {
            gateway_order_id: order.id.clone(),
            payment_id: "pay_1".to_string(),
            signature: api.signature_for(&order.id, "pay_1"),
        };
        api.verify_payment(None, &confirmation).await.unwrap();
        assert_eq!(api.verified_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let api = InMemoryPaymentApi::new();
        let order = api
            .create_gateway_order(None, Money::from_minor(5000))
            .await
            .unwrap();

        let confirmation = PaymentConfirmation {
            gateway_order_id: order.id,
            payment_id: "pay_1".to_string(),
            signature: "forged".to_string(),
        };
        assert!(api.verify_payment(None, &confirmation).await.is_err());
        assert_eq!(api.verified_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_order_rejected() {
        let api = InMemoryPaymentApi::new();
        let confirmation = PaymentConfirmation {
            gateway_order_id: "order_9999".to_string(),
            payment_id: "pay_1".to_string(),
            signature: api.signature_for("order_9999", "pay_1"),
        };
        assert!(api.verify_payment(None, &confirmation).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_on_create() {
        let api = InMemoryPaymentApi::new();
        api.set_fail_on_create(true);
        let result = api.create_gateway_order(None, Money::from_minor(100)).await;
        assert!(result.is_err());
        assert_eq!(api.created_count(), 0);
    }

    #[test]
    fn test_confirmation_wire_names() {
        let confirmation = PaymentConfirmation {
            gateway_order_id: "order_1".to_string(),
            payment_id: "pay_1".to_string(),
            signature: "sig".to_string(),
        };
        let json = serde_json::to_value(&confirmation).unwrap();
        assert_eq!(json["orderId"], "order_1");
        assert_eq!(json["paymentId"], "pay_1");
        assert_eq!(json["signature"], "sig");
    }
}
