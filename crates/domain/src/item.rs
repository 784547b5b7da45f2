//! Cart line items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::ProductId;
use crate::money::Money;

fn default_quantity() -> u32 {
    1
}

/// Errors raised when shaping add-to-cart input into a line item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    /// The input carries neither a cart product ID nor a raw catalog ID.
    #[error("invalid item: no resolvable product identifier")]
    InvalidItem,
}

/// A single line in the cart.
///
/// At most one `CartItem` exists per product ID; repeat adds merge into the
/// existing entry's quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key within the cart.
    pub product_id: ProductId,

    /// Display name of the product.
    pub name: String,

    /// Reference to the product image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    /// Price per unit in minor units. Absent on the wire means zero.
    #[serde(default)]
    pub unit_price: Money,

    /// Selected size variant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Number of units. Absent on the wire means one.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartItem {
    /// Price contribution of this line: unit price times quantity, with a
    /// zero quantity counted as one.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity.max(1))
    }
}

/// Add-to-cart input as it arrives from a product view.
///
/// Product views hand over whatever record they hold: some carry the
/// cart-specific `productId`, some only the raw catalog `_id`. Resolution
/// prefers the former and fails with [`ItemError::InvalidItem`] when neither
/// is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    /// Cart-specific product identifier, when the view already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,

    /// Raw catalog identifier, used as a fallback key.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<ProductId>,

    /// Display name of the product.
    #[serde(default)]
    pub name: String,

    /// Reference to the product image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    /// Price per unit in minor units.
    #[serde(default)]
    pub unit_price: Money,

    /// Selected size variant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Incoming quantity delta. Merged into an existing entry; a first
    /// insertion is always a single unit regardless of this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl NewCartItem {
    /// Builds an input from the fields every product view has.
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            product_id: Some(product_id.into()),
            name: name.into(),
            unit_price,
            ..Self::default()
        }
    }

    /// Resolves the product identifier, falling back to the raw catalog ID.
    pub fn resolve_product_id(&self) -> Result<ProductId, ItemError> {
        self.product_id
            .clone()
            .or_else(|| self.raw_id.clone())
            .ok_or(ItemError::InvalidItem)
    }

    /// The quantity delta applied when the product already sits in the cart.
    /// Absent or zero means one.
    pub fn quantity_delta(&self) -> u32 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }

    /// Shapes the input into a first-insertion line item with quantity 1.
    pub fn into_item(self, product_id: ProductId) -> CartItem {
        CartItem {
            product_id,
            name: self.name,
            image_ref: self.image_ref,
            unit_price: self.unit_price,
            size: self.size,
            quantity: 1,
        }
    }
}
