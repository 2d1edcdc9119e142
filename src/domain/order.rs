use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, Amount};

/// Sequential order identifier; equal to the order's position in the ledger.
pub type OrderId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Lifecycle of an escrowed order.
///
/// `Created -> Shipped -> Delivered -> Completed`, with `Created -> Cancelled`
/// as the only side branch. The numeric codes are part of the external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created = 0,
    Shipped = 1,
    Delivered = 2,
    Completed = 3,
    Cancelled = 4,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Created,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the order's price is still held by the ledger in this status.
    pub fn holds_custody(self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::Shipped)
    }

    /// Position along the lifecycle, used to check that status never regresses.
    /// `Cancelled` ranks after `Created` only; it is reachable from nowhere else.
    pub fn rank(self) -> u8 {
        match self {
            OrderStatus::Created => 0,
            OrderStatus::Shipped | OrderStatus::Cancelled => 1,
            OrderStatus::Delivered => 2,
            OrderStatus::Completed => 3,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order held in escrow by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub consumer: Address,
    pub producer: Address,
    pub product_id: u64,
    pub product_name: String,
    pub product_price: Amount,
    pub purchase_time: Timestamp,
    pub delivery_time: Option<Timestamp>,
    pub status: OrderStatus,
    pub producer_confirmed_shipment: bool,
    pub consumer_confirmed_delivery: bool,
    /// Set exactly once, right before custody is paid out (release or refund).
    pub(crate) settled: bool,
}

impl Order {
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn details(&self) -> OrderDetails {
        OrderDetails {
            id: self.id,
            consumer: self.consumer.clone(),
            producer: self.producer.clone(),
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            product_price: self.product_price,
            purchase_time: self.purchase_time,
            delivery_time: self.delivery_time.unwrap_or(0),
            status: self.status,
            producer_confirmed_shipment: self.producer_confirmed_shipment,
            consumer_confirmed_delivery: self.consumer_confirmed_delivery,
        }
    }
}

/// Payload for creating a new order. The caller becomes the consumer.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub producer: Address,
    pub product_id: u64,
    pub product_name: String,
    pub product_price: Amount,
    pub attached_funds: Amount,
}

impl OrderCreate {
    /// Payload that attaches exactly the declared price.
    pub fn new(
        producer: Address,
        product_id: u64,
        product_name: impl Into<String>,
        product_price: Amount,
    ) -> Self {
        Self {
            producer,
            product_id,
            product_name: product_name.into(),
            product_price,
            attached_funds: product_price,
        }
    }

    pub fn with_attached_funds(mut self, attached_funds: Amount) -> Self {
        self.attached_funds = attached_funds;
        self
    }
}

/// Read-only projection of an order. An unknown delivery time reads as `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: OrderId,
    pub consumer: Address,
    pub producer: Address,
    pub product_id: u64,
    pub product_name: String,
    pub product_price: Amount,
    pub purchase_time: Timestamp,
    pub delivery_time: Timestamp,
    pub status: OrderStatus,
    pub producer_confirmed_shipment: bool,
    pub consumer_confirmed_delivery: bool,
}

impl OrderDetails {
    /// Advisory only: whether the known delivery time falls within `window_secs`
    /// of the purchase. Never consulted by any transition.
    pub fn is_delivery_on_time(&self, window_secs: u64) -> bool {
        if self.purchase_time == 0 || self.delivery_time == 0 {
            return false;
        }
        self.delivery_time.abs_diff(self.purchase_time) <= window_secs
    }

    pub fn is_consumer(&self, who: &Address) -> bool {
        &self.consumer == who
    }

    pub fn is_producer(&self, who: &Address) -> bool {
        &self.producer == who
    }
}

/// Criteria for listing orders. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Only orders where this principal is the consumer or the producer.
    pub participant: Option<Address>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn participant(mut self, who: Address) -> Self {
        self.participant = Some(who);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        let participant_ok = self
            .participant
            .as_ref()
            .map_or(true, |who| &order.consumer == who || &order.producer == who);
        let status_ok = self.status.map_or(true, |s| order.status == s);
        participant_ok && status_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_stable() {
        for (code, status) in OrderStatus::ALL.iter().enumerate() {
            assert_eq!(status.code() as usize, code);
            assert_eq!(OrderStatus::from_code(code as u8), Some(*status));
        }
        assert_eq!(OrderStatus::from_code(5), None);
        assert_eq!(OrderStatus::Completed.as_str(), "Completed");
    }

    #[test]
    fn test_delivery_on_time_window() {
        let consumer = Address::new("0xc0").unwrap();
        let producer = Address::new("0xp0").unwrap();
        let mut details = OrderDetails {
            id: 0,
            consumer,
            producer,
            product_id: 1,
            product_name: "Smartphone".to_string(),
            product_price: Amount::from_wei(1),
            purchase_time: 1_000,
            delivery_time: 0,
            status: OrderStatus::Created,
            producer_confirmed_shipment: false,
            consumer_confirmed_delivery: false,
        };
        assert!(!details.is_delivery_on_time(48 * 3600));

        details.delivery_time = 1_000 + 48 * 3600;
        assert!(details.is_delivery_on_time(48 * 3600));

        details.delivery_time += 1;
        assert!(!details.is_delivery_on_time(48 * 3600));
    }
}
