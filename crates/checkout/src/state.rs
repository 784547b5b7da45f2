//! Payment stage state machine.

/// The state of the payment stage.
///
/// State transitions:
/// ```text
/// AwaitingMethod ──┬──► Deferred ────────────────────► (order placed)
///                  │        │
///                  │        └──► AwaitingMethod (method re-selected)
///                  └──► GatewayPending ──► Verified ──► (order placed)
///                               │
///                               └──► Failed ──► AwaitingMethod
/// ```
///
/// `Failed` is non-fatal: selecting a method again returns the stage to
/// `AwaitingMethod`. A placement failure keeps the stage in `Deferred` or
/// `Verified` so retrying does not re-run the gateway; from `Deferred` the
/// method can also be switched, discarding the pending outcome. A verified
/// gateway payment is locked in: `Verified` only retries placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentState {
    /// Waiting for the user to pick a payment method.
    #[default]
    AwaitingMethod,

    /// A deferred method was confirmed; the order is being placed with a
    /// pending outcome.
    Deferred,

    /// The gateway session is open and its confirmation is awaited.
    GatewayPending,

    /// The gateway confirmation was verified remotely; the paid outcome is
    /// held for placement.
    Verified,

    /// The gateway session or verification failed; the user is back at
    /// method selection.
    Failed,
}

impl PaymentState {
    /// Returns true if a payment method can be (re)selected.
    ///
    /// `Deferred` allows it because no money has moved yet; `Verified`
    /// does not, the payment is already captured.
    pub fn can_select_method(&self) -> bool {
        matches!(
            self,
            PaymentState::AwaitingMethod | PaymentState::Deferred | PaymentState::Failed
        )
    }

    /// Returns true if the stage can run or retry a confirmation.
    pub fn can_confirm(&self) -> bool {
        matches!(
            self,
            PaymentState::AwaitingMethod
                | PaymentState::Deferred
                | PaymentState::Verified
                | PaymentState::Failed
        )
    }

    /// Returns true if a computed payment outcome is being held.
    pub fn holds_outcome(&self) -> bool {
        matches!(self, PaymentState::Deferred | PaymentState::Verified)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::AwaitingMethod => "AwaitingMethod",
            PaymentState::Deferred => "Deferred",
            PaymentState::GatewayPending => "GatewayPending",
            PaymentState::Verified => "Verified",
            PaymentState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
