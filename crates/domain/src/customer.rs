//! Customer billing details.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating billing details.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomerError {
    /// A required billing field is empty or whitespace.
    #[error("incomplete form: field '{field}' is required")]
    IncompleteForm {
        /// Name of the first offending field.
        field: &'static str,
    },
}

/// Billing details collected at checkout.
///
/// Validated only at the checkout boundary; never persisted independently
/// of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Customer {
    /// Checks that every required field is non-empty.
    ///
    /// Whitespace-only values count as empty. Reports the first missing
    /// field in declaration order.
    pub fn validate(&self) -> Result<(), CustomerError> {
        let fields: [(&'static str, &str); 7] = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(CustomerError::IncompleteForm { field });
            }
        }

        Ok(())
    }
}
