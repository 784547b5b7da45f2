//! Payment method and outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a payment outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// A paid outcome needs a transaction reference from the gateway.
    #[error("a paid outcome requires a non-empty transaction reference")]
    EmptyTransactionRef,
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Payment collected later, outside this flow (cash on delivery).
    #[serde(rename = "COD")]
    Deferred,

    /// Payment confirmed through the third-party gateway before placement.
    #[serde(rename = "Online")]
    GatewayMediated,
}

impl PaymentMethod {
    /// Returns the method name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Deferred => "COD",
            PaymentMethod::GatewayMediated => "Online",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the payment has been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Not yet collected (always the case for deferred payments).
    Pending,

    /// Collected and verified through the gateway.
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

/// The payment result attached to an order.
///
/// Constructed only through [`PaymentOutcome::deferred`] and
/// [`PaymentOutcome::paid`], which uphold the invariant that a `Paid`
/// status always carries a gateway transaction reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    /// Selected payment method.
    pub method: PaymentMethod,

    /// Collection status.
    pub status: PaymentStatus,

    /// Gateway transaction reference, present only for paid outcomes.
    #[serde(rename = "transactionId")]
    pub transaction_ref: Option<String>,

    /// When the payment was collected.
    #[serde(rename = "paymentDate")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentOutcome {
    /// A deferred-method outcome: always pending, no transaction reference.
    pub fn deferred() -> Self {
        Self {
            method: PaymentMethod::Deferred,
            status: PaymentStatus::Pending,
            transaction_ref: None,
            paid_at: None,
        }
    }

    /// A gateway-mediated outcome verified at `paid_at`.
    pub fn paid(
        transaction_ref: impl Into<String>,
        paid_at: DateTime<Utc>,
    ) -> Result<Self, PaymentError> {
        let transaction_ref = transaction_ref.into();
        if transaction_ref.trim().is_empty() {
            return Err(PaymentError::EmptyTransactionRef);
        }

        Ok(Self {
            method: PaymentMethod::GatewayMediated,
            status: PaymentStatus::Paid,
            transaction_ref: Some(transaction_ref),
            paid_at: Some(paid_at),
        })
    }

    /// Returns true if the payment has been collected.
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_is_pending_without_ref() {
        let outcome = PaymentOutcome::deferred();
        assert_eq!(outcome.method, PaymentMethod::Deferred);
        assert_eq!(outcome.status, PaymentStatus::Pending);
        assert!(outcome.transaction_ref.is_none());
        assert!(outcome.paid_at.is_none());
        assert!(!outcome.is_paid());
    }

    #[test]
    fn test_paid_requires_transaction_ref() {
        assert_eq!(
            PaymentOutcome::paid("", Utc::now()),
            Err(PaymentError::EmptyTransactionRef)
        );
        assert_eq!(
            PaymentOutcome::paid("   ", Utc::now()),
            Err(PaymentError::EmptyTransactionRef)
        );
    }

    #[test]
    fn test_paid_outcome() {
        let now = Utc::now();
        let outcome = PaymentOutcome::paid("pay_123", now).unwrap();
        assert_eq!(outcome.method, PaymentMethod::GatewayMediated);
        assert_eq!(outcome.status, PaymentStatus::Paid);
        assert_eq!(outcome.transaction_ref.as_deref(), Some("pay_123"));
        assert_eq!(outcome.paid_at, Some(now));
        assert!(outcome.is_paid());
    }

    #[test]
    fn test_wire_method_names() {
        let json = serde_json::to_value(PaymentOutcome::deferred()).unwrap();
        assert_eq!(json["method"], "COD");
        assert_eq!(json["status"], "Pending");
        assert!(json["transactionId"].is_null());
    }
}
