//! Orders, their immutable item snapshots and the delivery state machine.
//!
//! ```text
//! Processing -> Assigned -> Out for Delivery -> Delivered -> Completed
//!      \            \
//!       +-----------+--> Cancelled
//! ```
//!
//! Automated orders skip the partner steps: the shopper confirms receipt
//! directly and the order moves to `Delivered`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::row_id;
use super::{CouponCode, PartnerId, ProductId, SavedAddress, UserId};

row_id!(
    /// Database identifier of an order.
    OrderId
);

/// Lifecycle status, stored and serialised as its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Processing,
    Assigned,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Assigned => "Assigned",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse the stored column value.
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Processing,
            Self::Assigned,
            Self::OutForDelivery,
            Self::Delivered,
            Self::Completed,
            Self::Cancelled,
        ]
        .into_iter()
        .find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who carries the order to the shopper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// A delivery partner is assigned and tracked.
    #[default]
    Partner,
    /// Fulfilled without a partner; the shopper confirms receipt.
    Automated,
}

impl DeliveryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Partner => "partner",
            Self::Automated => "automated",
        }
    }

    /// Parse the stored column value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "partner" => Some(Self::Partner),
            "automated" => Some(Self::Automated),
            _ => None,
        }
    }
}

/// Line of an order as it was priced at placement.
///
/// Later catalog edits never change a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub variant_label: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub quantity: u32,
}

/// Placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub shipping_address: Option<SavedAddress>,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub partner_id: Option<PartnerId>,
    pub coupon_code: Option<CouponCode>,
    pub created_at: DateTime<Utc>,
}

/// Order ready to be inserted with status `Processing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: Option<SavedAddress>,
    pub delivery_type: DeliveryType,
    pub coupon_code: Option<CouponCode>,
}

/// Requested change to an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTransition {
    /// Admin hands the order to an available partner.
    Assign(PartnerId),
    /// Assigned partner picks the order up.
    Accept,
    /// Assigned partner drops the order off.
    Deliver,
    /// Shopper confirms an automated delivery arrived.
    ConfirmReceipt,
    /// Admin cancels before pickup.
    Cancel,
    /// Admin closes a delivered order.
    Complete,
}

impl OrderTransition {
    fn name(self) -> &'static str {
        match self {
            Self::Assign(_) => "assign",
            Self::Accept => "accept",
            Self::Deliver => "deliver",
            Self::ConfirmReceipt => "confirm receipt of",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }

    /// Statuses this transition may start from.
    pub fn allowed_from(self) -> &'static [OrderStatus] {
        use OrderStatus::{Assigned, Delivered, OutForDelivery, Processing};
        match self {
            Self::Assign(_) | Self::Cancel => &[Processing, Assigned],
            Self::Accept => &[Assigned],
            Self::Deliver => &[OutForDelivery],
            Self::ConfirmReceipt => &[Processing, Assigned, OutForDelivery],
            Self::Complete => &[Delivered],
        }
    }

    /// Status the order holds after the transition.
    pub fn target(self) -> OrderStatus {
        match self {
            Self::Assign(_) => OrderStatus::Assigned,
            Self::Accept => OrderStatus::OutForDelivery,
            Self::Deliver | Self::ConfirmReceipt => OrderStatus::Delivered,
            Self::Cancel => OrderStatus::Cancelled,
            Self::Complete => OrderStatus::Completed,
        }
    }
}

/// Reasons a transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderTransitionError {
    #[error("cannot {action} an order that is {from}")]
    InvalidState {
        action: &'static str,
        from: OrderStatus,
    },
    #[error("only automated deliveries can be confirmed by the customer")]
    NotAutomated,
    #[error("automated deliveries cannot be assigned to a partner")]
    AutomatedAssignment,
    #[error("order is not assigned to this delivery partner")]
    NotAssignedPartner,
}

impl Order {
    /// Check `transition` against the current status and delivery type.
    ///
    /// `acting_partner` is the partner performing `Accept`/`Deliver`.
    ///
    /// # Examples
    /// ```
    /// use sresta_backend::domain::{OrderStatus, OrderTransition};
    ///
    /// assert!(OrderTransition::Cancel.allowed_from().contains(&OrderStatus::Assigned));
    /// assert_eq!(OrderTransition::Accept.target(), OrderStatus::OutForDelivery);
    /// ```
    pub fn check_transition(
        &self,
        transition: OrderTransition,
        acting_partner: Option<PartnerId>,
    ) -> Result<OrderStatus, OrderTransitionError> {
        match transition {
            OrderTransition::ConfirmReceipt if self.delivery_type != DeliveryType::Automated => {
                return Err(OrderTransitionError::NotAutomated);
            }
            OrderTransition::Assign(_) if self.delivery_type == DeliveryType::Automated => {
                return Err(OrderTransitionError::AutomatedAssignment);
            }
            OrderTransition::Accept | OrderTransition::Deliver
                if acting_partner.is_none() || self.partner_id != acting_partner =>
            {
                return Err(OrderTransitionError::NotAssignedPartner);
            }
            _ => {}
        }

        if transition.allowed_from().contains(&self.status) {
            Ok(transition.target())
        } else {
            Err(OrderTransitionError::InvalidState {
                action: transition.name(),
                from: self.status,
            })
        }
    }

    /// Whether the assigned partner's location may be shown for this order.
    pub fn is_trackable(&self) -> bool {
        self.delivery_type == DeliveryType::Partner
            && self.partner_id.is_some()
            && matches!(
                self.status,
                OrderStatus::Assigned | OrderStatus::OutForDelivery
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn order() -> Order {
        Order {
            id: OrderId::new(7),
            user_id: UserId::new(1),
            items: vec![OrderItem {
                product_id: ProductId::new(2),
                name: "Toor Dal".to_owned(),
                variant_label: "1kg".to_owned(),
                price: dec!(140),
                quantity: 2,
            }],
            total_amount: dec!(330),
            shipping_address: Some(SavedAddress::new("Home", "Ameerpet, Hyderabad").expect("address")),
            status: OrderStatus::Processing,
            delivery_type: DeliveryType::Partner,
            partner_id: None,
            coupon_code: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn with(mut order: Order, status: OrderStatus, partner: Option<i64>) -> Order {
        order.status = status;
        order.partner_id = partner.map(PartnerId::new);
        order
    }

    #[rstest]
    #[case(OrderStatus::Processing, None, OrderTransition::Assign(PartnerId::new(3)), None)]
    #[case(OrderStatus::Assigned, Some(3), OrderTransition::Assign(PartnerId::new(4)), None)]
    #[case(OrderStatus::Assigned, Some(3), OrderTransition::Accept, Some(3))]
    #[case(OrderStatus::OutForDelivery, Some(3), OrderTransition::Deliver, Some(3))]
    #[case(OrderStatus::Processing, None, OrderTransition::Cancel, None)]
    #[case(OrderStatus::Assigned, Some(3), OrderTransition::Cancel, None)]
    #[case(OrderStatus::Delivered, Some(3), OrderTransition::Complete, None)]
    fn permitted_transitions(
        order: Order,
        #[case] status: OrderStatus,
        #[case] partner: Option<i64>,
        #[case] transition: OrderTransition,
        #[case] actor: Option<i64>,
    ) {
        let order = with(order, status, partner);
        let next = order
            .check_transition(transition, actor.map(PartnerId::new))
            .expect("transition permitted");
        assert_eq!(next, transition.target());
    }

    #[rstest]
    #[case(OrderStatus::OutForDelivery, OrderTransition::Assign(PartnerId::new(3)))]
    #[case(OrderStatus::OutForDelivery, OrderTransition::Cancel)]
    #[case(OrderStatus::Delivered, OrderTransition::Cancel)]
    #[case(OrderStatus::Cancelled, OrderTransition::Complete)]
    #[case(OrderStatus::Processing, OrderTransition::Complete)]
    #[case(OrderStatus::Completed, OrderTransition::Assign(PartnerId::new(3)))]
    fn refused_transitions(
        order: Order,
        #[case] status: OrderStatus,
        #[case] transition: OrderTransition,
    ) {
        let order = with(order, status, Some(3));
        let err = order
            .check_transition(transition, None)
            .expect_err("transition refused");
        assert!(matches!(err, OrderTransitionError::InvalidState { from, .. } if from == status));
    }

    #[rstest]
    fn partner_cannot_accept_someone_elses_order(order: Order) {
        let order = with(order, OrderStatus::Assigned, Some(3));
        let err = order
            .check_transition(OrderTransition::Accept, Some(PartnerId::new(9)))
            .expect_err("wrong partner");
        assert_eq!(err, OrderTransitionError::NotAssignedPartner);
    }

    #[rstest]
    fn partner_cannot_deliver_before_accepting(order: Order) {
        let order = with(order, OrderStatus::Assigned, Some(3));
        let err = order
            .check_transition(OrderTransition::Deliver, Some(PartnerId::new(3)))
            .expect_err("not picked up yet");
        assert_eq!(
            err.to_string(),
            "cannot deliver an order that is Assigned"
        );
    }

    #[rstest]
    #[case(OrderStatus::Processing, true)]
    #[case(OrderStatus::OutForDelivery, true)]
    #[case(OrderStatus::Delivered, false)]
    #[case(OrderStatus::Completed, false)]
    #[case(OrderStatus::Cancelled, false)]
    fn confirm_receipt_for_automated_orders(
        mut order: Order,
        #[case] status: OrderStatus,
        #[case] permitted: bool,
    ) {
        order.delivery_type = DeliveryType::Automated;
        order.status = status;
        assert_eq!(
            order.check_transition(OrderTransition::ConfirmReceipt, None).is_ok(),
            permitted
        );
    }

    #[rstest]
    fn confirm_receipt_rejects_partner_orders(order: Order) {
        assert_eq!(
            order.check_transition(OrderTransition::ConfirmReceipt, None),
            Err(OrderTransitionError::NotAutomated)
        );
    }

    #[rstest]
    fn automated_orders_cannot_be_assigned(mut order: Order) {
        order.delivery_type = DeliveryType::Automated;
        assert_eq!(
            order.check_transition(OrderTransition::Assign(PartnerId::new(3)), None),
            Err(OrderTransitionError::AutomatedAssignment)
        );
    }

    #[rstest]
    #[case(OrderStatus::Processing, Some(3), DeliveryType::Partner, false)]
    #[case(OrderStatus::Assigned, Some(3), DeliveryType::Partner, true)]
    #[case(OrderStatus::OutForDelivery, Some(3), DeliveryType::Partner, true)]
    #[case(OrderStatus::OutForDelivery, Some(3), DeliveryType::Automated, false)]
    #[case(OrderStatus::Delivered, Some(3), DeliveryType::Partner, false)]
    fn trackability(
        order: Order,
        #[case] status: OrderStatus,
        #[case] partner: Option<i64>,
        #[case] delivery_type: DeliveryType,
        #[case] expected: bool,
    ) {
        let mut order = with(order, status, partner);
        order.delivery_type = delivery_type;
        assert_eq!(order.is_trackable(), expected);
    }

    #[rstest]
    fn status_strings_round_trip() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Assigned,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
            assert_eq!(
                serde_json::to_value(status).expect("serialise status"),
                serde_json::Value::String(status.as_str().to_owned())
            );
        }
        assert_eq!(OrderStatus::parse("out for delivery"), None);
    }

    #[rstest]
    fn item_snapshot_uses_camel_case(order: Order) {
        let value = serde_json::to_value(&order.items).expect("serialise items");
        assert_eq!(value[0]["productId"], 2);
        assert_eq!(value[0]["variantLabel"], "1kg");
        let back: Vec<OrderItem> = serde_json::from_value(value).expect("deserialise items");
        assert_eq!(back, order.items);
    }
}
