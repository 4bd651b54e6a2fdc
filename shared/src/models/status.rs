//! Order lifecycle statuses and the stock effect of each transition

use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status shared by customer orders and material orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

pub const ALL_STATUSES: [OrderStatus; 7] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

/// Error returned when a status string is not part of the lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status case-insensitively. `canceled` is accepted as `cancelled`.
    pub fn parse(raw: &str) -> Result<Self, UnknownStatus> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownStatus(raw.to_string())),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Delivered and completed orders count as fulfilled
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::parse(s)
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OrderStatus::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Stock movement implied by a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEffect {
    None,
    /// Return a cancelled customer order's items to product stock
    Restock,
    /// Add received material to stock and record its price
    Receive,
    /// Take back material that was received by a now-cancelled order
    ReverseReceipt,
}

impl StockEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockEffect::None => "none",
            StockEffect::Restock => "restock",
            StockEffect::Receive => "receive",
            StockEffect::ReverseReceipt => "reverse_receipt",
        }
    }
}

/// Stock effect of moving a customer order from `previous` to `next`.
///
/// Only the move into `cancelled` has an effect. Leaving `cancelled` does not
/// withdraw stock again.
pub fn customer_order_effect(previous: OrderStatus, next: OrderStatus) -> StockEffect {
    if !previous.is_cancelled() && next.is_cancelled() {
        StockEffect::Restock
    } else {
        StockEffect::None
    }
}

/// Stock effect of moving a material order from `previous` to `next`
pub fn material_order_effect(previous: OrderStatus, next: OrderStatus) -> StockEffect {
    if !previous.is_fulfilled() && next.is_fulfilled() {
        StockEffect::Receive
    } else if previous.is_fulfilled() && next.is_cancelled() {
        StockEffect::ReverseReceipt
    } else {
        StockEffect::None
    }
}

/// True when a customer order leaves `cancelled` for a live status.
/// Stock is not withdrawn again in that case.
pub fn is_reactivation(previous: OrderStatus, next: OrderStatus) -> bool {
    previous.is_cancelled() && !next.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(OrderStatus::parse("Cancelled"), Ok(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("CANCELED"), Ok(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse(" completed "), Ok(OrderStatus::Completed));
        assert!(OrderStatus::parse("cancel").is_err());
        assert!(OrderStatus::parse("").is_err());
    }

    #[test]
    fn deserializes_from_json_string() {
        let status: OrderStatus = serde_json::from_str("\"Canceled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"cancelled\"");
        assert!(serde_json::from_str::<OrderStatus>("\"lost\"").is_err());
    }

    #[test]
    fn customer_cancel_restocks_once() {
        assert_eq!(
            customer_order_effect(OrderStatus::Pending, OrderStatus::Cancelled),
            StockEffect::Restock
        );
        assert_eq!(
            customer_order_effect(OrderStatus::Cancelled, OrderStatus::Cancelled),
            StockEffect::None
        );
        assert_eq!(
            customer_order_effect(OrderStatus::Cancelled, OrderStatus::Pending),
            StockEffect::None
        );
        assert!(is_reactivation(OrderStatus::Cancelled, OrderStatus::Pending));
    }

    #[test]
    fn material_completion_and_reversal() {
        assert_eq!(
            material_order_effect(OrderStatus::Pending, OrderStatus::Completed),
            StockEffect::Receive
        );
        assert_eq!(
            material_order_effect(OrderStatus::Completed, OrderStatus::Cancelled),
            StockEffect::ReverseReceipt
        );
        assert_eq!(
            material_order_effect(OrderStatus::Pending, OrderStatus::Cancelled),
            StockEffect::None
        );
        assert_eq!(
            material_order_effect(OrderStatus::Delivered, OrderStatus::Completed),
            StockEffect::None
        );
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(ALL_STATUSES.to_vec())
    }

    proptest! {
        #[test]
        fn customer_orders_never_withdraw_on_transition(prev in any_status(), next in any_status()) {
            let effect = customer_order_effect(prev, next);
            prop_assert!(matches!(effect, StockEffect::None | StockEffect::Restock));
            prop_assert_eq!(effect == StockEffect::Restock, !prev.is_cancelled() && next.is_cancelled());
        }

        #[test]
        fn repeated_status_has_no_effect(status in any_status()) {
            prop_assert_eq!(customer_order_effect(status, status), StockEffect::None);
            prop_assert_eq!(material_order_effect(status, status), StockEffect::None);
        }

        #[test]
        fn status_round_trips_through_its_name(status in any_status()) {
            prop_assert_eq!(OrderStatus::parse(&status.as_str().to_uppercase()), Ok(status));
        }
    }
}
