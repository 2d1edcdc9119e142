use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::clients::LedgerClient;
use crate::domain::{Address, Amount, LedgerEvent, OrderCreate, OrderDetails, OrderFilter, OrderId, Timestamp};
use crate::error::EscrowError;
use crate::ledger::{Clock, EscrowLedger, SystemClock};
use crate::messages::{LedgerRequest, ServiceResponse};

/// Owns the [`EscrowLedger`] and applies requests strictly one at a time.
///
/// The mailbox is the ledger's single serialization point: a request is fully
/// applied (state, events, value) before the next one is received. Events
/// committed by a request are forwarded to broadcast subscribers before its
/// reply is sent.
///
/// There is no actor per order: one service owns every order along with the
/// wallets and custody, since a payout updates an order and a wallet in the
/// same step.
pub struct LedgerService<C: Clock = SystemClock> {
    receiver: mpsc::Receiver<LedgerRequest>,
    ledger: EscrowLedger<C>,
    events: broadcast::Sender<LedgerEvent>,
    published: u64,
}

impl<C: Clock> LedgerService<C> {
    pub fn new(buffer_size: usize, event_capacity: usize, clock: C) -> (Self, LedgerClient) {
        Self::with_ledger(EscrowLedger::new(clock), buffer_size, event_capacity)
    }

    /// Wraps an existing ledger, e.g. one pre-funded by a test.
    pub fn with_ledger(ledger: EscrowLedger<C>, buffer_size: usize, event_capacity: usize) -> (Self, LedgerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let published = ledger.events().len() as u64;
        let service = Self {
            receiver,
            ledger,
            events: events.clone(),
            published,
        };
        let client = LedgerClient::new(sender, events);
        (service, client)
    }

    #[instrument(name = "ledger_service", skip(self))]
    pub async fn run(mut self) {
        info!("LedgerService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                LedgerRequest::Deposit { owner, amount, respond_to } => {
                    self.handle_deposit(owner, amount, respond_to);
                }
                LedgerRequest::CreateOrder { caller, create, respond_to } => {
                    self.handle_create_order(caller, create, respond_to);
                }
                LedgerRequest::SpecifyDeliveryDate {
                    caller,
                    order_id,
                    delivery_time,
                    respond_to,
                } => {
                    self.handle_specify_delivery_date(caller, order_id, delivery_time, respond_to);
                }
                LedgerRequest::ConfirmShipment { caller, order_id, respond_to } => {
                    self.handle_confirm_shipment(caller, order_id, respond_to);
                }
                LedgerRequest::ConfirmDelivery { caller, order_id, respond_to } => {
                    self.handle_confirm_delivery(caller, order_id, respond_to);
                }
                LedgerRequest::CancelOrder { caller, order_id, respond_to } => {
                    self.handle_cancel_order(caller, order_id, respond_to);
                }
                LedgerRequest::GetOrderDetails { order_id, respond_to } => {
                    self.handle_get_order_details(order_id, respond_to);
                }
                LedgerRequest::OrderCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.order_count()));
                }
                LedgerRequest::ListOrders { filter, respond_to } => {
                    self.handle_list_orders(filter, respond_to);
                }
                LedgerRequest::BalanceOf { owner, respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.balance_of(&owner)));
                }
                LedgerRequest::CustodyBalance { respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.custody_balance()));
                }
                LedgerRequest::EventsSince { from, respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.events_since(from).to_vec()));
                }
                LedgerRequest::Shutdown => {
                    info!("LedgerService shutting down");
                    break;
                }
                #[cfg(test)]
                LedgerRequest::VerifyConservation { respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.verify_conservation()));
                }
            }
        }

        info!(
            orders = self.ledger.order_count(),
            custody = %self.ledger.custody_balance(),
            "LedgerService stopped"
        );
    }

    #[instrument(fields(owner = %owner, amount = %amount), skip(self, owner, amount, respond_to))]
    fn handle_deposit(&mut self, owner: Address, amount: Amount, respond_to: ServiceResponse<Amount, EscrowError>) {
        debug!("Processing deposit request");
        let result = self.ledger.deposit(&owner, amount);
        match &result {
            Ok(balance) => info!(balance = %balance, "Wallet funded"),
            Err(e) => warn!(error = %e, "Deposit rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(
        fields(
            consumer = %caller.short(),
            producer = %create.producer.short(),
            product_id = create.product_id,
            price = %create.product_price
        ),
        skip(self, caller, create, respond_to)
    )]
    fn handle_create_order(
        &mut self,
        caller: Address,
        create: OrderCreate,
        respond_to: ServiceResponse<OrderId, EscrowError>,
    ) {
        debug!("Processing create_order request");
        let result = self.ledger.create_order(&caller, create);
        match &result {
            Ok(order_id) => info!(order_id = %order_id, "Order created, funds in custody"),
            Err(e) => warn!(error = %e, "Order creation rejected"),
        }
        self.publish();
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %order_id, caller = %caller.short()), skip(self, order_id, caller, respond_to))]
    fn handle_specify_delivery_date(
        &mut self,
        caller: Address,
        order_id: OrderId,
        delivery_time: Timestamp,
        respond_to: ServiceResponse<(), EscrowError>,
    ) {
        debug!("Processing specify_delivery_date request");
        let result = self.ledger.specify_delivery_date(&caller, order_id, delivery_time);
        match &result {
            Ok(()) => info!(delivery_time, "Delivery date specified"),
            Err(e) => warn!(error = %e, "Delivery date rejected"),
        }
        self.publish();
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %order_id, caller = %caller.short()), skip(self, order_id, caller, respond_to))]
    fn handle_confirm_shipment(&mut self, caller: Address, order_id: OrderId, respond_to: ServiceResponse<(), EscrowError>) {
        debug!("Processing confirm_shipment request");
        let result = self.ledger.confirm_shipment(&caller, order_id);
        match &result {
            Ok(()) => info!("Shipment confirmed"),
            Err(e) => warn!(error = %e, "Shipment confirmation rejected"),
        }
        self.publish();
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %order_id, caller = %caller.short()), skip(self, order_id, caller, respond_to))]
    fn handle_confirm_delivery(
        &mut self,
        caller: Address,
        order_id: OrderId,
        respond_to: ServiceResponse<Amount, EscrowError>,
    ) {
        debug!("Processing confirm_delivery request");
        let result = self.ledger.confirm_delivery(&caller, order_id);
        match &result {
            Ok(amount) => info!(amount = %amount, "Delivery confirmed, payment released"),
            Err(e) => warn!(error = %e, "Delivery confirmation rejected"),
        }
        self.publish();
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %order_id, caller = %caller.short()), skip(self, order_id, caller, respond_to))]
    fn handle_cancel_order(&mut self, caller: Address, order_id: OrderId, respond_to: ServiceResponse<Amount, EscrowError>) {
        debug!("Processing cancel_order request");
        let result = self.ledger.cancel_order(&caller, order_id);
        match &result {
            Ok(refund) => info!(refund = %refund, "Order cancelled, consumer refunded"),
            Err(e) => warn!(error = %e, "Cancellation rejected"),
        }
        self.publish();
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %order_id), skip(self, order_id, respond_to))]
    fn handle_get_order_details(
        &self,
        order_id: OrderId,
        respond_to: ServiceResponse<OrderDetails, EscrowError>,
    ) {
        debug!("Processing get_order_details request");
        let result = self.ledger.order_details(order_id);
        match &result {
            Ok(details) => debug!(status = %details.status, "Order found"),
            Err(_) => debug!("Order not found"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list_orders(
        &self,
        filter: OrderFilter,
        respond_to: ServiceResponse<Vec<OrderDetails>, EscrowError>,
    ) {
        debug!("Processing list_orders request");
        let orders = self.ledger.list_orders(&filter);
        debug!(matched = orders.len(), "Orders listed");
        let _ = respond_to.send(Ok(orders));
    }

    /// Forwards events appended since the last publish to live subscribers.
    fn publish(&mut self) {
        for event in self.ledger.events_since(self.published) {
            debug!(sequence = event.sequence, kind = event.kind.name(), "Publishing event");
            // No subscribers is not an error; the log itself is the record.
            let _ = self.events.send(event.clone());
        }
        self.published = self.ledger.events().len() as u64;
    }
}
