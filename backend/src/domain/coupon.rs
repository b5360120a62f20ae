//! Coupons and the rules deciding whether one applies to a cart.
//!
//! Validation has no side effects. A coupon is not marked as used, so any
//! shopper may apply it any number of times until it expires.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::row_id;
use super::pricing::{checked_subtotal, round_money};

row_id!(
    /// Database identifier of a coupon.
    CouponId
);

/// Longest accepted coupon code.
pub const COUPON_CODE_MAX: usize = 32;

/// Validation errors raised by coupon value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponValidationError {
    #[error("coupon code must not be empty")]
    EmptyCode,
    #[error("coupon code must be at most {max} characters")]
    CodeTooLong { max: usize },
    #[error("coupon code may only contain letters, digits, '-' or '_'")]
    InvalidCodeCharacters,
    #[error("discount value must be greater than zero")]
    NonPositiveValue,
    #[error("percentage discounts cannot exceed 100")]
    PercentageTooLarge,
    #[error("minimum purchase amount must not be negative")]
    NegativeMinPurchase,
}

/// Coupon code, trimmed and upper-cased on construction.
///
/// # Examples
/// ```
/// use sresta_backend::domain::CouponCode;
///
/// let code = CouponCode::new(" save10 ").unwrap();
/// assert_eq!(code.as_ref(), "SAVE10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "SAVE10")]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, CouponValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(CouponValidationError::EmptyCode);
        }
        if code.chars().count() > COUPON_CODE_MAX {
            return Err(CouponValidationError::CodeTooLong {
                max: COUPON_CODE_MAX,
            });
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CouponValidationError::InvalidCodeCharacters);
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How a coupon's value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` percent of the subtotal.
    Percentage,
    /// Flat `value`, capped at the subtotal.
    Fixed,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }

    /// Parse the stored column value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Validated coupon fields for inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponDraft {
    pub code: CouponCode,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub expiry_date: NaiveDate,
    pub min_purchase_amount: Decimal,
    pub applicable_category: Option<String>,
    pub poster_url: Option<String>,
    pub description: Option<String>,
}

impl CouponDraft {
    /// Check the numeric fields and normalise optional text.
    pub fn validated(mut self) -> Result<Self, CouponValidationError> {
        if self.discount_value <= Decimal::ZERO {
            return Err(CouponValidationError::NonPositiveValue);
        }
        if self.discount_type == DiscountType::Percentage && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(CouponValidationError::PercentageTooLarge);
        }
        if self.min_purchase_amount < Decimal::ZERO {
            return Err(CouponValidationError::NegativeMinPurchase);
        }
        self.applicable_category = non_blank(self.applicable_category);
        self.poster_url = non_blank(self.poster_url);
        self.description = non_blank(self.description);
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Stored coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: CouponId,
    pub code: CouponCode,
    pub discount_type: DiscountType,
    #[schema(value_type = f64)]
    pub discount_value: Decimal,
    pub expiry_date: NaiveDate,
    #[schema(value_type = f64)]
    pub min_purchase_amount: Decimal,
    pub applicable_category: Option<String>,
    pub poster_url: Option<String>,
    pub description: Option<String>,
}

impl Coupon {
    /// A coupon stays valid through the whole of its expiry date.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }

    /// Discount this coupon grants on `subtotal`, ignoring eligibility.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        match self.discount_type {
            DiscountType::Percentage => {
                round_money(subtotal.saturating_mul(self.discount_value) / Decimal::ONE_HUNDRED)
            }
            DiscountType::Fixed => self.discount_value.min(subtotal),
        }
    }
}

/// Cart line as seen by coupon validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCartLine {
    pub price: Decimal,
    pub quantity: u32,
    /// Category of the line's product, if it is still in the catalog.
    pub category: Option<String>,
}

/// Why a coupon does not apply. Messages are shown to shoppers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Invalid coupon code")]
    NotFound,
    #[error("Coupon expired on {expiry_date}")]
    Expired { expiry_date: NaiveDate },
    #[error("Minimum purchase of ₹{min_purchase} required for this coupon")]
    MinPurchaseNotMet { min_purchase: Decimal },
    #[error("Coupon only applies to {category} items")]
    CategoryMismatch { category: String },
    #[error("Cart total is out of range")]
    CartOutOfRange,
}

/// Coupon accepted for a cart together with the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    #[schema(value_type = f64)]
    pub discount: Decimal,
}

/// Check a coupon against a cart on `today`.
///
/// Rules run in order: expiry, minimum purchase, category. The first failure
/// wins. A cart whose subtotal cannot be represented is refused outright. Category matching ignores case and surrounding whitespace.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use sresta_backend::domain::{
///     Coupon, CouponCartLine, CouponCode, CouponId, DiscountType, validate_coupon,
/// };
///
/// let coupon = Coupon {
///     id: CouponId::new(1),
///     code: CouponCode::new("SAVE10").unwrap(),
///     discount_type: DiscountType::Percentage,
///     discount_value: Decimal::from(10),
///     expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
///     min_purchase_amount: Decimal::from(500),
///     applicable_category: None,
///     poster_url: None,
///     description: None,
/// };
/// let cart = [CouponCartLine { price: Decimal::from(500), quantity: 2, category: None }];
/// let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let applied = validate_coupon(&coupon, &cart, today).unwrap();
/// assert_eq!(applied.discount, Decimal::from(100));
/// ```
pub fn validate_coupon(
    coupon: &Coupon,
    cart: &[CouponCartLine],
    today: NaiveDate,
) -> Result<AppliedCoupon, CouponRejection> {
    if coupon.is_expired_on(today) {
        return Err(CouponRejection::Expired {
            expiry_date: coupon.expiry_date,
        });
    }

    let subtotal = checked_subtotal(cart.iter().map(|line| (line.price, line.quantity)))
        .map_err(|_| CouponRejection::CartOutOfRange)?;
    if subtotal < coupon.min_purchase_amount {
        return Err(CouponRejection::MinPurchaseNotMet {
            min_purchase: coupon.min_purchase_amount,
        });
    }

    if let Some(category) = coupon.applicable_category.as_deref() {
        let wanted = category.trim();
        let matches = cart.iter().any(|line| {
            line.category
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted))
        });
        if !matches {
            return Err(CouponRejection::CategoryMismatch {
                category: wanted.to_owned(),
            });
        }
    }

    Ok(AppliedCoupon {
        discount: coupon.discount_for(subtotal),
        coupon: coupon.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[fixture]
    fn save10() -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: CouponCode::new("save10").expect("code"),
            discount_type: DiscountType::Percentage,
            discount_value: dec!(10),
            expiry_date: date(2026, 12, 31),
            min_purchase_amount: dec!(500),
            applicable_category: None,
            poster_url: None,
            description: None,
        }
    }

    fn cart(subtotal: Decimal, category: Option<&str>) -> Vec<CouponCartLine> {
        vec![CouponCartLine {
            price: subtotal,
            quantity: 1,
            category: category.map(str::to_owned),
        }]
    }

    #[rstest]
    fn save10_on_a_thousand_rupee_cart(save10: Coupon) {
        let applied =
            validate_coupon(&save10, &cart(dec!(1000), None), date(2026, 6, 1)).expect("applies");
        assert_eq!(applied.discount, dec!(100));
        assert_eq!(applied.coupon.code.as_ref(), "SAVE10");
    }

    #[rstest]
    #[case(date(2026, 12, 31), true)]
    #[case(date(2027, 1, 1), false)]
    fn coupon_is_valid_through_expiry_day(
        save10: Coupon,
        #[case] today: NaiveDate,
        #[case] applies: bool,
    ) {
        let result = validate_coupon(&save10, &cart(dec!(1000), None), today);
        assert_eq!(result.is_ok(), applies);
        if !applies {
            assert_eq!(
                result.expect_err("expired"),
                CouponRejection::Expired {
                    expiry_date: date(2026, 12, 31)
                }
            );
        }
    }

    #[rstest]
    fn rejects_below_minimum_purchase(save10: Coupon) {
        let err = validate_coupon(&save10, &cart(dec!(499.99), None), date(2026, 6, 1))
            .expect_err("below minimum");
        assert_eq!(
            err,
            CouponRejection::MinPurchaseNotMet {
                min_purchase: dec!(500)
            }
        );
    }

    #[rstest]
    #[case(Some("Dairy"), true)]
    #[case(Some(" dairy "), true)]
    #[case(Some("Snacks"), false)]
    #[case(None, false)]
    fn category_restriction(
        mut save10: Coupon,
        #[case] line_category: Option<&str>,
        #[case] applies: bool,
    ) {
        save10.applicable_category = Some("Dairy".to_owned());
        let result = validate_coupon(&save10, &cart(dec!(800), line_category), date(2026, 6, 1));
        match (applies, result) {
            (true, Ok(_)) => {}
            (false, Err(CouponRejection::CategoryMismatch { category })) => {
                assert_eq!(category, "Dairy");
            }
            (_, other) => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[case(dec!(50), dec!(400), dec!(50))]
    #[case(dec!(500), dec!(400), dec!(400))]
    #[case(dec!(400), dec!(400), dec!(400))]
    fn fixed_discount_never_exceeds_subtotal(
        mut save10: Coupon,
        #[case] value: Decimal,
        #[case] subtotal: Decimal,
        #[case] expected: Decimal,
    ) {
        save10.discount_type = DiscountType::Fixed;
        save10.discount_value = value;
        save10.min_purchase_amount = Decimal::ZERO;
        let applied = validate_coupon(&save10, &cart(subtotal, None), date(2026, 6, 1))
            .expect("applies");
        assert_eq!(applied.discount, expected);
        assert!(applied.discount <= subtotal);
    }

    #[rstest]
    fn percentage_discount_rounds_to_paise(mut save10: Coupon) {
        save10.discount_value = dec!(12.5);
        assert_eq!(save10.discount_for(dec!(999.99)), dec!(125.00));
    }

    #[rstest]
    #[case(dec!(100000000000000000000), u32::MAX)]
    #[case(Decimal::MAX, 2)]
    #[case(dec!(10000000000), 1)]
    fn oversized_carts_are_refused_without_panicking(
        save10: Coupon,
        #[case] price: Decimal,
        #[case] quantity: u32,
    ) {
        let lines = [CouponCartLine {
            price,
            quantity,
            category: None,
        }];
        let err = validate_coupon(&save10, &lines, date(2026, 6, 1)).expect_err("out of range");
        assert_eq!(err, CouponRejection::CartOutOfRange);
    }

    #[rstest]
    #[case("", CouponValidationError::EmptyCode)]
    #[case("SAVE 10", CouponValidationError::InvalidCodeCharacters)]
    #[case("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456", CouponValidationError::CodeTooLong { max: COUPON_CODE_MAX })]
    fn code_validation(#[case] raw: &str, #[case] expected: CouponValidationError) {
        assert_eq!(CouponCode::new(raw).expect_err("invalid"), expected);
    }

    #[rstest]
    #[case(DiscountType::Percentage, dec!(0), dec!(0), CouponValidationError::NonPositiveValue)]
    #[case(DiscountType::Percentage, dec!(101), dec!(0), CouponValidationError::PercentageTooLarge)]
    #[case(DiscountType::Fixed, dec!(50), dec!(-1), CouponValidationError::NegativeMinPurchase)]
    fn draft_validation(
        save10: Coupon,
        #[case] discount_type: DiscountType,
        #[case] value: Decimal,
        #[case] min_purchase: Decimal,
        #[case] expected: CouponValidationError,
    ) {
        let draft = CouponDraft {
            code: save10.code,
            discount_type,
            discount_value: value,
            expiry_date: save10.expiry_date,
            min_purchase_amount: min_purchase,
            applicable_category: None,
            poster_url: None,
            description: None,
        };
        assert_eq!(draft.validated().expect_err("invalid draft"), expected);
    }

    #[rstest]
    fn draft_blanks_become_none(save10: Coupon) {
        let draft = CouponDraft {
            code: save10.code,
            discount_type: DiscountType::Fixed,
            discount_value: dec!(50),
            expiry_date: save10.expiry_date,
            min_purchase_amount: Decimal::ZERO,
            applicable_category: Some("  ".to_owned()),
            poster_url: Some(String::new()),
            description: Some(" Diwali offer ".to_owned()),
        }
        .validated()
        .expect("valid draft");
        assert_eq!(draft.applicable_category, None);
        assert_eq!(draft.poster_url, None);
        assert_eq!(draft.description.as_deref(), Some("Diwali offer"));
    }
}
