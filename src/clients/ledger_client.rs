use tokio::sync::{broadcast, mpsc};
use tracing::{debug, instrument};

use crate::domain::{Address, Amount, LedgerEvent, OrderCreate, OrderDetails, OrderFilter, OrderId, Timestamp};
use crate::error::EscrowError;
use crate::messages::LedgerRequest;

/// Cloneable handle to the ledger service.
///
/// Each method is one atomic ledger call; calls from all clones are serialized
/// by the service's mailbox.
#[derive(Clone)]
pub struct LedgerClient {
    sender: mpsc::Sender<LedgerRequest>,
    events: broadcast::Sender<LedgerEvent>,
}

impl LedgerClient {
    pub fn new(sender: mpsc::Sender<LedgerRequest>, events: broadcast::Sender<LedgerEvent>) -> Self {
        Self { sender, events }
    }

    /// Live feed of committed events. Use [`LedgerClient::events_since`] to
    /// replay anything emitted before subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), EscrowError> {
        debug!("Sending shutdown request");
        self.sender
            .send(LedgerRequest::Shutdown)
            .await
            .map_err(|e| EscrowError::ServiceUnavailable(e.to_string()))?;
        Ok(())
    }
}

client_method!(LedgerClient => fn deposit(owner: Address, amount: Amount) -> Amount as LedgerRequest::Deposit);
client_method!(LedgerClient => fn create_order(caller: Address, create: OrderCreate) -> OrderId as LedgerRequest::CreateOrder);
client_method!(LedgerClient => fn specify_delivery_date(caller: Address, order_id: OrderId, delivery_time: Timestamp) -> () as LedgerRequest::SpecifyDeliveryDate);
client_method!(LedgerClient => fn confirm_shipment(caller: Address, order_id: OrderId) -> () as LedgerRequest::ConfirmShipment);
client_method!(LedgerClient => fn confirm_delivery(caller: Address, order_id: OrderId) -> Amount as LedgerRequest::ConfirmDelivery);
client_method!(LedgerClient => fn cancel_order(caller: Address, order_id: OrderId) -> Amount as LedgerRequest::CancelOrder);
client_method!(LedgerClient => fn get_order_details(order_id: OrderId) -> OrderDetails as LedgerRequest::GetOrderDetails);
client_method!(LedgerClient => fn order_count() -> u64 as LedgerRequest::OrderCount);
client_method!(LedgerClient => fn list_orders(filter: OrderFilter) -> Vec<OrderDetails> as LedgerRequest::ListOrders);
client_method!(LedgerClient => fn balance_of(owner: Address) -> Amount as LedgerRequest::BalanceOf);
client_method!(LedgerClient => fn custody_balance() -> Amount as LedgerRequest::CustodyBalance);
client_method!(LedgerClient => fn events_since(from: u64) -> Vec<LedgerEvent> as LedgerRequest::EventsSince);

// Test-only invariant probe
#[cfg(test)]
client_method!(LedgerClient => fn verify_conservation() -> bool as LedgerRequest::VerifyConservation);
