//! # Cart
//!
//! The shopping cart and its lines.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations (copy-and-return)                    │
//! │                                                                         │
//! │  Operation                    Result                                    │
//! │  ─────────                    ──────                                    │
//! │                                                                         │
//! │  cart.add_item(p, q) ───────► new Cart (line merged or appended)        │
//! │                                                                         │
//! │  cart.update_item_quantity ─► new Cart (line quantity replaced)         │
//! │                                                                         │
//! │  cart.remove_item(id) ──────► new Cart (line dropped)                   │
//! │                                                                         │
//! │  cart.clear() ──────────────► new Cart (no lines, same id/user)         │
//! │                                                                         │
//! │  NOTE: The receiver is never modified. There is no shared mutable       │
//! │        cart, so concurrent pricing calls need no locking.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Price};
use crate::product::Product;
use crate::types::{CartId, ProductId, Quantity, UserId};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// ## Price Freezing
/// `unit_price` is captured when the line is created. If the product price
/// changes later, the line keeps the original price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    product: Product,
    quantity: Quantity,
    unit_price: Price,
}

impl CartItem {
    /// Creates a line at the product's current price.
    pub fn new(product: Product, quantity: Quantity) -> Self {
        let unit_price = product.price();
        CartItem {
            product,
            quantity,
            unit_price,
        }
    }

    /// Creates a line with an explicitly captured unit price.
    pub fn with_unit_price(product: Product, quantity: Quantity, unit_price: Price) -> Self {
        CartItem {
            product,
            quantity,
            unit_price,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> ProductId {
        self.product.id()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Line total (unit price × quantity).
    ///
    /// Saturates at [`Money::MAX`]; lines admitted to a [`Cart`] never do.
    pub fn total_price(&self) -> Money {
        self.unit_price.times(self.quantity).unwrap_or(Money::MAX)
    }

    /// A line is valid while its product is active and has enough stock.
    pub fn is_valid(&self) -> bool {
        self.product.is_available_for(self.quantity)
    }

    /// True when the captured price no longer matches the live product price.
    pub fn has_price_drift(&self) -> bool {
        self.unit_price != self.product.price()
    }

    pub fn with_quantity(&self, quantity: Quantity) -> CartItem {
        CartItem {
            quantity,
            ..self.clone()
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product merges)
/// - Every line was admitted with an active product and enough stock
/// - Every line total, and the cart total, fits in [`Money::MAX`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self::with_id(CartId::new(), user_id)
    }

    pub fn with_id(id: CartId, user_id: UserId) -> Self {
        let now = Utc::now();
        Cart {
            id,
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors and derived values
    // -------------------------------------------------------------------------

    pub fn id(&self) -> CartId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sum of all line totals.
    pub fn total_amount(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |total, item| total.saturating_add(item.total_price()))
    }

    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.value()))
            .sum()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    /// True when any line's product belongs to `category`.
    pub fn contains_category(&self, category: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.product.is_in_category(category))
    }

    // -------------------------------------------------------------------------
    // Copy-and-return transitions
    // -------------------------------------------------------------------------

    /// Adds `quantity` of `product`, merging with an existing line.
    ///
    /// ## Errors
    /// - `ProductInactive` if the product is deactivated
    /// - `InsufficientStock` if stock cannot cover the merged quantity
    /// - `Validation` if the line or cart total would exceed [`Money::MAX`]
    pub fn add_item(&self, product: &Product, quantity: Quantity) -> CoreResult<Cart> {
        if !product.is_active() {
            return Err(CoreError::ProductInactive {
                product: product.name().to_string(),
            });
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id() == product.id()) {
            Some(existing) => {
                let merged = existing.quantity.add(quantity)?;
                ensure_stock(product, merged)?;
                existing.quantity = merged;
            }
            None => {
                ensure_stock(product, quantity)?;
                items.push(CartItem::new(product.clone(), quantity));
            }
        }

        ensure_representable(&items)?;
        Ok(self.with_items(items))
    }

    /// Appends an already-built line (e.g. restored with a captured price).
    ///
    /// The same admission rules as [`Cart::add_item`] apply.
    pub fn add_line(&self, line: CartItem) -> CoreResult<Cart> {
        if self.find_item(line.product_id()).is_some() {
            return self.add_item(line.product(), line.quantity());
        }
        if !line.product.is_active() {
            return Err(CoreError::ProductInactive {
                product: line.product.name().to_string(),
            });
        }
        ensure_stock(&line.product, line.quantity)?;

        let mut items = self.items.clone();
        items.push(line);
        ensure_representable(&items)?;
        Ok(self.with_items(items))
    }

    /// Removes the line for `product_id`.
    ///
    /// ## Errors
    /// `NotInCart` when no such line exists.
    pub fn remove_item(&self, product_id: ProductId) -> CoreResult<Cart> {
        if self.find_item(product_id).is_none() {
            return Err(self.not_in_cart(product_id));
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.product_id() != product_id)
            .cloned()
            .collect();
        Ok(self.with_items(items))
    }

    /// Replaces the quantity of the line for `product_id`.
    pub fn update_item_quantity(&self, product_id: ProductId, quantity: Quantity) -> CoreResult<Cart> {
        let line = self
            .find_item(product_id)
            .ok_or_else(|| self.not_in_cart(product_id))?;
        ensure_stock(line.product(), quantity)?;

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.product_id() == product_id {
                    item.with_quantity(quantity)
                } else {
                    item.clone()
                }
            })
            .collect::<Vec<_>>();
        ensure_representable(&items)?;
        Ok(self.with_items(items))
    }

    /// Returns an empty cart with the same identity.
    pub fn clear(&self) -> Cart {
        self.with_items(Vec::new())
    }

    fn with_items(&self, items: Vec<CartItem>) -> Cart {
        Cart {
            items,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    fn not_in_cart(&self, product_id: ProductId) -> CoreError {
        CoreError::NotInCart {
            cart_id: self.id.to_string(),
            product_id: product_id.to_string(),
        }
    }
}

fn ensure_representable(items: &[CartItem]) -> CoreResult<()> {
    let mut total = Money::zero();
    for item in items {
        let line = item.unit_price.times(item.quantity)?;
        total = total
            .checked_add(line)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "cart_total".to_string(),
                min: "0".to_string(),
                max: Money::MAX.to_string(),
            })?;
    }
    Ok(())
}

fn ensure_stock(product: &Product, quantity: Quantity) -> CoreResult<()> {
    if product.stock().has_enough(quantity) {
        Ok(())
    } else {
        Err(CoreError::InsufficientStock {
            product: product.name().to_string(),
            available: product.stock().quantity(),
            requested: quantity.value(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
