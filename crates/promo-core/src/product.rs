//! # Product
//!
//! A catalog product. Products are immutable values: stock and activation
//! changes return a new `Product`, leaving the original untouched. The
//! catalog store owns the canonical copy; the pricing core only reads it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreResult;
use crate::money::Price;
use crate::types::{ProductId, Quantity, Stock};
use crate::validation::{
    validate_optional_text, validate_product_name, ValidationResult, MAX_DESCRIPTION_LEN,
};

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Price,
    stock: Stock,
    category: Option<String>,
    brand: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new, active product.
    ///
    /// ## Errors
    /// `Validation` if the name is blank or longer than 100 characters.
    pub fn new(name: &str, price: Price, stock: Stock) -> ValidationResult<Self> {
        Self::with_id(ProductId::new(), name, price, stock)
    }

    /// Creates a new, active product with a known id.
    pub fn with_id(id: ProductId, name: &str, price: Price, stock: Stock) -> ValidationResult<Self> {
        validate_product_name(name)?;
        let now = Utc::now();
        Ok(Product {
            id,
            name: name.trim().to_string(),
            description: None,
            price,
            stock,
            category: None,
            brand: None,
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Builder-style setters (used when constructing)
    // -------------------------------------------------------------------------

    pub fn with_description(mut self, description: &str) -> ValidationResult<Self> {
        validate_optional_text("description", Some(description), MAX_DESCRIPTION_LEN)?;
        self.description = Some(description.to_string());
        Ok(self)
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.trim().to_string());
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.trim().to_string());
        self
    }

    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.trim().to_string());
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock(&self) -> Stock {
        self.stock
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the product is active and `quantity` units are on hand.
    pub fn is_available_for(&self, quantity: Quantity) -> bool {
        self.is_active && self.stock.has_enough(quantity)
    }

    /// Case-insensitive category match.
    pub fn is_in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category.trim()))
    }

    // -------------------------------------------------------------------------
    // Copy-and-return transitions
    // -------------------------------------------------------------------------

    /// Returns a copy with `quantity` fewer units in stock.
    ///
    /// ## Errors
    /// `InsufficientStock` when the product does not have enough units.
    pub fn reduce_stock(&self, quantity: Quantity) -> CoreResult<Product> {
        let stock = self.stock.reduce(quantity, &self.name)?;
        Ok(self.touched(|p| p.stock = stock))
    }

    /// Returns a copy with `quantity` more units in stock.
    pub fn increase_stock(&self, quantity: Quantity) -> CoreResult<Product> {
        let stock = self.stock.increase(quantity)?;
        Ok(self.touched(|p| p.stock = stock))
    }

    pub fn change_price(&self, price: Price) -> Product {
        self.touched(|p| p.price = price)
    }

    pub fn activate(&self) -> Product {
        self.touched(|p| p.is_active = true)
    }

    pub fn deactivate(&self) -> Product {
        self.touched(|p| p.is_active = false)
    }

    fn touched(&self, change: impl FnOnce(&mut Product)) -> Product {
        let mut next = self.clone();
        change(&mut next);
        next.updated_at = Utc::now();
        next
    }
}
