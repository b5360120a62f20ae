//! Checkout carts resolved against the live catalog.
//!
//! Clients send product and variant references with quantities. Prices,
//! names and categories always come from the catalog so a tampered cart
//! cannot change what is charged.

use std::collections::HashMap;

use super::{
    CouponCartLine, MAX_LINE_QUANTITY, OrderItem, PricedLine, Product, ProductId, VariantId,
};

/// Cart line as submitted by a shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Preferred variant reference; falls back to `variant_label` when absent.
    pub variant_id: Option<VariantId>,
    pub variant_label: String,
    pub quantity: u32,
}

/// Reasons a cart cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,
    #[error("quantity for product {0} must be at least 1")]
    ZeroQuantity(ProductId),
    #[error("quantity for product {product_id} must be at most {max}")]
    QuantityTooLarge { product_id: ProductId, max: u32 },
    #[error("product {0} is no longer available")]
    UnknownProduct(ProductId),
    #[error("variant {label} of product {product_id} is no longer available")]
    UnknownVariant { product_id: ProductId, label: String },
}

/// Cart line with catalog data filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub item: OrderItem,
    pub category: String,
}

impl ResolvedLine {
    pub fn priced(&self) -> PricedLine {
        PricedLine {
            price: self.item.price,
            quantity: self.item.quantity,
            variant_label: self.item.variant_label.clone(),
        }
    }

    pub fn coupon_line(&self) -> CouponCartLine {
        CouponCartLine {
            price: self.item.price,
            quantity: self.item.quantity,
            category: Some(self.category.clone()),
        }
    }
}

/// Resolve every line against `catalog`, keeping the cart order.
pub fn resolve_cart(lines: &[CartLine], catalog: &[Product]) -> Result<Vec<ResolvedLine>, CartError> {
    if lines.is_empty() {
        return Err(CartError::Empty);
    }
    let by_id: HashMap<ProductId, &Product> = catalog.iter().map(|p| (p.id, p)).collect();

    lines
        .iter()
        .map(|line| {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.product_id));
            }
            if line.quantity > MAX_LINE_QUANTITY {
                return Err(CartError::QuantityTooLarge {
                    product_id: line.product_id,
                    max: MAX_LINE_QUANTITY,
                });
            }
            let product = by_id
                .get(&line.product_id)
                .ok_or(CartError::UnknownProduct(line.product_id))?;
            let variant = match line.variant_id {
                Some(id) => product.variants.iter().find(|v| v.id == id),
                None => product.variant_by_label(&line.variant_label),
            }
            .ok_or_else(|| CartError::UnknownVariant {
                product_id: line.product_id,
                label: line.variant_label.clone(),
            })?;

            Ok(ResolvedLine {
                item: OrderItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    variant_label: variant.label.clone(),
                    price: variant.price,
                    quantity: line.quantity,
                },
                category: product.category.clone(),
            })
        })
        .collect()
}
