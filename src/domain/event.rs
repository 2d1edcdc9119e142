use serde::{Deserialize, Serialize};

use super::{Address, Amount, OrderId, Timestamp};

/// One entry of the ledger's append-only event log.
///
/// `sequence` is the entry's position in the log and is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub sequence: u64,
    pub order_id: OrderId,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    OrderCreated {
        consumer: Address,
        producer: Address,
        product_id: u64,
        price: Amount,
        purchase_time: Timestamp,
    },
    OrderShipped {
        shipped_time: Timestamp,
    },
    DeliveryDateSpecified {
        delivery_time: Timestamp,
    },
    OrderDelivered {
        delivery_time: Timestamp,
    },
    PaymentReleased {
        producer: Address,
        amount: Amount,
    },
    OrderCancelled {
        consumer: Address,
        refund: Amount,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OrderCreated { .. } => "OrderCreated",
            EventKind::OrderShipped { .. } => "OrderShipped",
            EventKind::DeliveryDateSpecified { .. } => "DeliveryDateSpecified",
            EventKind::OrderDelivered { .. } => "OrderDelivered",
            EventKind::PaymentReleased { .. } => "PaymentReleased",
            EventKind::OrderCancelled { .. } => "OrderCancelled",
        }
    }

    /// True for the two records that move value out of custody.
    pub fn is_payout(&self) -> bool {
        matches!(self, EventKind::PaymentReleased { .. } | EventKind::OrderCancelled { .. })
    }
}

impl LedgerEvent {
    /// Single-line JSON encoding, for export and replay.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
