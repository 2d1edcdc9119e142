use tokio::sync::oneshot;

use crate::domain::{Address, Amount, LedgerEvent, OrderCreate, OrderDetails, OrderFilter, OrderId, Timestamp};
use crate::error::EscrowError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests handled by [`crate::actors::LedgerService`]. Every variant that acts
/// on behalf of a counterparty carries the caller's identity.
#[derive(Debug)]
pub enum LedgerRequest {
    Deposit {
        owner: Address,
        amount: Amount,
        respond_to: ServiceResponse<Amount, EscrowError>,
    },
    CreateOrder {
        caller: Address,
        create: OrderCreate,
        respond_to: ServiceResponse<OrderId, EscrowError>,
    },
    SpecifyDeliveryDate {
        caller: Address,
        order_id: OrderId,
        delivery_time: Timestamp,
        respond_to: ServiceResponse<(), EscrowError>,
    },
    ConfirmShipment {
        caller: Address,
        order_id: OrderId,
        respond_to: ServiceResponse<(), EscrowError>,
    },
    ConfirmDelivery {
        caller: Address,
        order_id: OrderId,
        respond_to: ServiceResponse<Amount, EscrowError>,
    },
    CancelOrder {
        caller: Address,
        order_id: OrderId,
        respond_to: ServiceResponse<Amount, EscrowError>,
    },
    GetOrderDetails {
        order_id: OrderId,
        respond_to: ServiceResponse<OrderDetails, EscrowError>,
    },
    OrderCount {
        respond_to: ServiceResponse<u64, EscrowError>,
    },
    ListOrders {
        filter: OrderFilter,
        respond_to: ServiceResponse<Vec<OrderDetails>, EscrowError>,
    },
    BalanceOf {
        owner: Address,
        respond_to: ServiceResponse<Amount, EscrowError>,
    },
    CustodyBalance {
        respond_to: ServiceResponse<Amount, EscrowError>,
    },
    EventsSince {
        from: u64,
        respond_to: ServiceResponse<Vec<LedgerEvent>, EscrowError>,
    },
    Shutdown,
    #[cfg(test)]
    VerifyConservation {
        respond_to: ServiceResponse<bool, EscrowError>,
    },
}
