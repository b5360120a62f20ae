//! Checkout pricing: subtotal, discounts, weight-based regional shipping.
//!
//! Everything here is a pure function over [`Decimal`] so totals are exact to
//! the paisa. Inputs are treated permissively: a missing address ships free
//! and a label without a recognisable weight weighs nothing. Arithmetic is
//! checked; amounts beyond [`MONEY_MAX`] are refused with [`PricingError`].

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

/// Fraction of the subtotal taken off a shopper's first order.
pub const FIRST_ORDER_DISCOUNT_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Subtotal above which Hyderabad deliveries ship free.
pub const HYDERABAD_FREE_SHIPPING_ABOVE: Decimal = Decimal::from_parts(1500, 0, 0, false, 0);

/// Largest amount a `NUMERIC(12,2)` column holds: 9,999,999,999.99.
pub const MONEY_MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Most units of one variant a single cart line may carry.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

const GRAMS_PER_KG: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Round a money amount to two decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

static WEIGHT_RE: OnceLock<Regex> = OnceLock::new();

fn weight_regex() -> &'static Regex {
    WEIGHT_RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|g)")
            .unwrap_or_else(|error| panic!("weight regex failed to compile: {error}"))
    })
}

/// Parse the weight in kilograms from a variant label such as `"500g"`.
///
/// The first `<number><unit>` match wins. Units are `kg` or `g`, matched
/// case-insensitively. Labels without a match weigh zero.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use sresta_backend::domain::parse_weight_kg;
///
/// assert_eq!(parse_weight_kg("500g"), Decimal::new(5, 1));
/// assert_eq!(parse_weight_kg("2 KG pack"), Decimal::from(2));
/// assert_eq!(parse_weight_kg("1 dozen"), Decimal::ZERO);
/// ```
pub fn parse_weight_kg(label: &str) -> Decimal {
    let Some(captures) = weight_regex().captures(label) else {
        return Decimal::ZERO;
    };
    let (Some(number), Some(unit)) = (captures.get(1), captures.get(2)) else {
        return Decimal::ZERO;
    };
    let Ok(value) = Decimal::from_str(number.as_str()) else {
        return Decimal::ZERO;
    };
    if unit.as_str().eq_ignore_ascii_case("kg") {
        value
    } else {
        value / GRAMS_PER_KG
    }
}

/// Reasons a cart cannot be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("order amount exceeds the supported range")]
    AmountOutOfRange,
}

/// Exact sum of `price × quantity` over `lines`.
///
/// Fails when any step overflows or the sum exceeds [`MONEY_MAX`].
pub fn checked_subtotal<I>(lines: I) -> Result<Decimal, PricingError>
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    let total = lines
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (price, quantity)| {
            price
                .checked_mul(Decimal::from(quantity))
                .and_then(|line| acc.checked_add(line))
        })
        .ok_or(PricingError::AmountOutOfRange)?;
    within_money_range(total)
}

fn within_money_range(amount: Decimal) -> Result<Decimal, PricingError> {
    if amount > MONEY_MAX {
        Err(PricingError::AmountOutOfRange)
    } else {
        Ok(amount)
    }
}

/// Weight charged for shipping: whole kilograms, rounded up, at least one.
pub fn billed_weight_kg(total_weight_kg: Decimal) -> Decimal {
    total_weight_kg.ceil().max(Decimal::ONE)
}

/// Coarse delivery region derived from free-text address matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingRegion {
    Hyderabad,
    Telangana,
    AndhraPradesh,
    RestOfIndia,
}

impl ShippingRegion {
    /// Classify an address by case-insensitive substring, checked in order.
    pub fn from_address(address: &str) -> Self {
        let address = address.to_lowercase();
        if address.contains("hyderabad") {
            Self::Hyderabad
        } else if address.contains("telangana") {
            Self::Telangana
        } else if address.contains("andhra pradesh") || address.contains("a.p") {
            Self::AndhraPradesh
        } else {
            Self::RestOfIndia
        }
    }

    /// Rate charged per billed kilogram.
    pub fn rate_per_kg(self) -> Decimal {
        match self {
            Self::Hyderabad => Decimal::from(50),
            Self::Telangana => Decimal::from(150),
            Self::AndhraPradesh => Decimal::from(200),
            Self::RestOfIndia => Decimal::from(350),
        }
    }
}

/// Shipping charge for a cart.
///
/// An empty or missing address ships free. Hyderabad orders above
/// [`HYDERABAD_FREE_SHIPPING_ABOVE`] ship free; everything else pays the
/// region rate per billed kilogram.
pub fn calculate_shipping(
    subtotal: Decimal,
    address: Option<&str>,
    total_weight_kg: Decimal,
) -> Decimal {
    let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) else {
        return Decimal::ZERO;
    };
    let region = ShippingRegion::from_address(address);
    if region == ShippingRegion::Hyderabad && subtotal > HYDERABAD_FREE_SHIPPING_ABOVE {
        return Decimal::ZERO;
    }
    region
        .rate_per_kg()
        .saturating_mul(billed_weight_kg(total_weight_kg))
}

/// One priced cart line as seen by the pricing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub price: Decimal,
    pub quantity: u32,
    pub variant_label: String,
}

/// Everything the engine needs to price a checkout.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub lines: &'a [PricedLine],
    pub shipping_address: Option<&'a str>,
    pub is_first_order: bool,
    /// Discount already computed by coupon validation.
    pub coupon_discount: Decimal,
}

/// Price breakdown shown at checkout and stored with the order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[schema(value_type = f64)]
    pub first_order_discount: Decimal,
    #[schema(value_type = f64)]
    pub coupon_discount: Decimal,
    #[schema(value_type = f64)]
    pub shipping: Decimal,
    #[schema(value_type = f64)]
    pub total_weight_kg: Decimal,
    #[schema(value_type = f64)]
    pub billed_weight_kg: Decimal,
    #[schema(value_type = f64)]
    pub final_total: Decimal,
}

/// Cart subtotal: the exact sum of `price × quantity`.
pub fn subtotal(lines: &[PricedLine]) -> Result<Decimal, PricingError> {
    checked_subtotal(lines.iter().map(|line| (line.price, line.quantity)))
}

/// Total cart weight. A line whose weight overflows counts as weightless.
fn total_weight_kg(lines: &[PricedLine]) -> Result<Decimal, PricingError> {
    lines
        .iter()
        .map(|line| {
            parse_weight_kg(&line.variant_label)
                .checked_mul(Decimal::from(line.quantity))
                .unwrap_or(Decimal::ZERO)
        })
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or(PricingError::AmountOutOfRange)
}

/// Price a checkout.
///
/// The final total is clamped at zero however large the discounts are.
/// Carts whose subtotal or shipping exceed [`MONEY_MAX`] are refused.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use sresta_backend::domain::{PricedLine, PricingInput, price_order};
///
/// let lines = [PricedLine {
///     price: Decimal::from(600),
///     quantity: 2,
///     variant_label: "500g".into(),
/// }];
/// let breakdown = price_order(PricingInput {
///     lines: &lines,
///     shipping_address: Some("Madhapur, Hyderabad"),
///     is_first_order: true,
///     coupon_discount: Decimal::ZERO,
/// })
/// .unwrap();
/// assert_eq!(breakdown.first_order_discount, Decimal::from(120));
/// assert_eq!(breakdown.shipping, Decimal::from(50));
/// assert_eq!(breakdown.final_total, Decimal::from(1130));
/// ```
pub fn price_order(input: PricingInput<'_>) -> Result<PriceBreakdown, PricingError> {
    let subtotal = subtotal(input.lines)?;
    let first_order_discount = if input.is_first_order {
        round_money(subtotal * FIRST_ORDER_DISCOUNT_RATE)
    } else {
        Decimal::ZERO
    };
    let coupon_discount = input.coupon_discount.max(Decimal::ZERO);
    let total_weight_kg = total_weight_kg(input.lines)?;
    let shipping = within_money_range(calculate_shipping(
        subtotal,
        input.shipping_address,
        total_weight_kg,
    ))?;
    let final_total = subtotal
        .checked_sub(first_order_discount)
        .and_then(|amount| amount.checked_sub(coupon_discount))
        .and_then(|amount| amount.checked_add(shipping))
        .ok_or(PricingError::AmountOutOfRange)?
        .max(Decimal::ZERO);
    let final_total = within_money_range(final_total)?;

    Ok(PriceBreakdown {
        subtotal,
        first_order_discount,
        coupon_discount,
        shipping,
        total_weight_kg,
        billed_weight_kg: billed_weight_kg(total_weight_kg),
        final_total,
    })
}
