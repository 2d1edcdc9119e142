use std::collections::HashMap;

use crate::domain::{
    Address, Amount, EventKind, LedgerEvent, Order, OrderCreate, OrderDetails, OrderFilter,
    OrderId, OrderStatus, Timestamp,
};
use crate::error::EscrowError;

use super::authorization::{authorize, Role};
use super::clock::{Clock, SystemClock};

/// The escrow state machine.
///
/// Orders live in an arena indexed by [`OrderId`]; they are never removed, only
/// frozen once terminal. The ledger is the sole holder of custodied value and the
/// sole writer of the event log.
///
/// Every operation validates all of its preconditions before touching any state,
/// so an `Err` return leaves the ledger exactly as it was. Within a successful
/// transition the order fields are committed first, then the settlement guard is
/// set, the events are appended, and value moves last.
///
/// `supply` is the sum of every wallet plus custody. Only `deposit` grows it, and
/// it never exceeds `u128::MAX`, so no single wallet can overflow on a payout.
#[derive(Debug)]
pub struct EscrowLedger<C: Clock = SystemClock> {
    orders: Vec<Order>,
    balances: HashMap<Address, Amount>,
    custody: Amount,
    supply: Amount,
    events: Vec<LedgerEvent>,
    clock: C,
}

impl Default for EscrowLedger<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> EscrowLedger<C> {
    pub fn new(clock: C) -> Self {
        Self {
            orders: Vec::new(),
            balances: HashMap::new(),
            custody: Amount::ZERO,
            supply: Amount::ZERO,
            events: Vec::new(),
            clock,
        }
    }

    // -------------------------------------------------------------------------
    // Wallets
    // -------------------------------------------------------------------------

    /// Credits an external wallet. Returns the new balance.
    ///
    /// Rejects a credit that would push the ledger's total supply past `u128::MAX`.
    pub fn deposit(&mut self, owner: &Address, amount: Amount) -> Result<Amount, EscrowError> {
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or_else(|| EscrowError::InvalidAmount(format!("deposit of {} wei overflows ledger supply", amount.wei())))?;
        let updated = self
            .balance_of(owner)
            .checked_add(amount)
            .ok_or_else(|| EscrowError::InvalidAmount(format!("balance overflow for {owner}")))?;
        self.balances.insert(owner.clone(), updated);
        self.supply = supply;
        Ok(updated)
    }

    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(Amount::ZERO)
    }

    /// Total value currently held by the ledger on behalf of open orders.
    pub fn custody_balance(&self) -> Amount {
        self.custody
    }

    /// Everything ever deposited: all wallets plus custody.
    pub fn total_supply(&self) -> Amount {
        self.supply
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Opens a new order funded by `caller`, who becomes its consumer.
    pub fn create_order(&mut self, caller: &Address, create: OrderCreate) -> Result<OrderId, EscrowError> {
        let mismatch = EscrowError::InsufficientOrMismatchedPayment {
            price: create.product_price,
            attached: create.attached_funds,
        };
        if create.product_price.is_zero() || create.attached_funds != create.product_price {
            return Err(mismatch);
        }
        let remaining = self
            .balance_of(caller)
            .checked_sub(create.attached_funds)
            .ok_or_else(|| mismatch.clone())?;
        let custody = self.custody.checked_add(create.attached_funds).ok_or(mismatch)?;

        let id = self.orders.len() as OrderId;
        let now = self.clock.now();
        self.orders.push(Order {
            id,
            consumer: caller.clone(),
            producer: create.producer.clone(),
            product_id: create.product_id,
            product_name: create.product_name,
            product_price: create.product_price,
            purchase_time: now,
            delivery_time: None,
            status: OrderStatus::Created,
            producer_confirmed_shipment: false,
            consumer_confirmed_delivery: false,
            settled: false,
        });
        self.emit(
            id,
            EventKind::OrderCreated {
                consumer: caller.clone(),
                producer: create.producer,
                product_id: create.product_id,
                price: create.product_price,
                purchase_time: now,
            },
        );
        self.balances.insert(caller.clone(), remaining);
        self.custody = custody;
        Ok(id)
    }

    /// Records the consumer's expected delivery date. Advisory only; a zero
    /// timestamp clears it.
    pub fn specify_delivery_date(
        &mut self,
        caller: &Address,
        order_id: OrderId,
        delivery_time: Timestamp,
    ) -> Result<(), EscrowError> {
        let index = self.index_of(order_id)?;
        let order = &self.orders[index];
        authorize(caller, order, Role::Consumer)?;
        require_status(order, &[OrderStatus::Created, OrderStatus::Shipped], "specify delivery date of")?;

        self.orders[index].delivery_time = (delivery_time != 0).then_some(delivery_time);
        self.emit(order_id, EventKind::DeliveryDateSpecified { delivery_time });
        Ok(())
    }

    /// Producer attests that the goods have left.
    pub fn confirm_shipment(&mut self, caller: &Address, order_id: OrderId) -> Result<(), EscrowError> {
        let index = self.index_of(order_id)?;
        let order = &self.orders[index];
        authorize(caller, order, Role::Producer)?;
        require_status(order, &[OrderStatus::Created], "confirm shipment of")?;

        let now = self.clock.now();
        let order = &mut self.orders[index];
        order.producer_confirmed_shipment = true;
        order.status = OrderStatus::Shipped;
        self.emit(order_id, EventKind::OrderShipped { shipped_time: now });
        Ok(())
    }

    /// Consumer attests receipt. Moves the order through `Delivered` to
    /// `Completed` in one step and releases the full price to the producer.
    /// Returns the released amount.
    pub fn confirm_delivery(&mut self, caller: &Address, order_id: OrderId) -> Result<Amount, EscrowError> {
        let index = self.index_of(order_id)?;
        let order = &self.orders[index];
        authorize(caller, order, Role::Consumer)?;
        require_status(order, &[OrderStatus::Shipped], "confirm delivery of")?;
        require_unsettled(order, "confirm delivery of")?;
        let payout = self.plan_payout(&order.producer, order.product_price)?;

        let now = self.clock.now();
        let order = &mut self.orders[index];
        order.consumer_confirmed_delivery = true;
        let delivery_time = *order.delivery_time.get_or_insert(now);
        order.status = OrderStatus::Completed;
        order.settled = true;
        let producer = order.producer.clone();
        let amount = order.product_price;

        self.emit(order_id, EventKind::OrderDelivered { delivery_time });
        self.emit(
            order_id,
            EventKind::PaymentReleased {
                producer: producer.clone(),
                amount,
            },
        );
        self.transfer_out(&producer, payout);
        Ok(amount)
    }

    /// Consumer withdraws before shipment and is refunded in full.
    /// Returns the refunded amount.
    pub fn cancel_order(&mut self, caller: &Address, order_id: OrderId) -> Result<Amount, EscrowError> {
        let index = self.index_of(order_id)?;
        let order = &self.orders[index];
        authorize(caller, order, Role::Consumer)?;
        require_status(order, &[OrderStatus::Created], "cancel")?;
        require_unsettled(order, "cancel")?;
        let payout = self.plan_payout(&order.consumer, order.product_price)?;

        let order = &mut self.orders[index];
        order.status = OrderStatus::Cancelled;
        order.settled = true;
        let consumer = order.consumer.clone();
        let refund = order.product_price;

        self.emit(
            order_id,
            EventKind::OrderCancelled {
                consumer: consumer.clone(),
                refund,
            },
        );
        self.transfer_out(&consumer, payout);
        Ok(refund)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn order_details(&self, order_id: OrderId) -> Result<OrderDetails, EscrowError> {
        let index = self.index_of(order_id)?;
        Ok(self.orders[index].details())
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        usize::try_from(order_id).ok().and_then(|i| self.orders.get(i))
    }

    pub fn order_count(&self) -> u64 {
        self.orders.len() as u64
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> Vec<OrderDetails> {
        self.orders
            .iter()
            .filter(|order| filter.matches(order))
            .map(Order::details)
            .collect()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Events with `sequence >= from`, for replay by late observers.
    pub fn events_since(&self, from: u64) -> &[LedgerEvent] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }

    /// Custody equals the summed price of every order still in `Created` or
    /// `Shipped`, every such order is unsettled, and wallets plus custody add up
    /// to the deposited supply.
    pub fn verify_conservation(&self) -> bool {
        let open: Amount = self
            .orders
            .iter()
            .filter(|order| order.status.holds_custody())
            .map(|order| order.product_price)
            .sum();
        let guards_consistent = self
            .orders
            .iter()
            .all(|order| order.settled == order.status.is_terminal());
        let held = self
            .balances
            .values()
            .try_fold(self.custody, |total, balance| total.checked_add(*balance));
        open == self.custody && guards_consistent && held == Some(self.supply)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn index_of(&self, order_id: OrderId) -> Result<usize, EscrowError> {
        usize::try_from(order_id)
            .ok()
            .filter(|&i| i < self.orders.len())
            .ok_or(EscrowError::NotFound(order_id))
    }

    fn emit(&mut self, order_id: OrderId, kind: EventKind) {
        let sequence = self.events.len() as u64;
        self.events.push(LedgerEvent {
            sequence,
            order_id,
            kind,
        });
    }

    /// Computes the custody and payee balances after paying `amount` out of
    /// custody, failing if either would leave the `u128` range.
    fn plan_payout(&self, payee: &Address, amount: Amount) -> Result<Payout, EscrowError> {
        let custody = self.custody.checked_sub(amount).ok_or_else(|| {
            EscrowError::InvalidAmount(format!("custody holds less than {} wei", amount.wei()))
        })?;
        let balance = self
            .balance_of(payee)
            .checked_add(amount)
            .ok_or_else(|| EscrowError::InvalidAmount(format!("balance overflow for {payee}")))?;
        Ok(Payout { custody, balance })
    }

    /// Applies a planned payout. Callers have already committed the order's
    /// terminal status and settlement guard.
    fn transfer_out(&mut self, payee: &Address, payout: Payout) {
        self.custody = payout.custody;
        self.balances.insert(payee.clone(), payout.balance);
    }
}

#[derive(Debug, Clone, Copy)]
struct Payout {
    custody: Amount,
    balance: Amount,
}

fn require_status(order: &Order, allowed: &[OrderStatus], operation: &'static str) -> Result<(), EscrowError> {
    if allowed.contains(&order.status) {
        Ok(())
    } else {
        Err(EscrowError::InvalidState {
            order_id: order.id,
            status: order.status,
            operation,
        })
    }
}

fn require_unsettled(order: &Order, operation: &'static str) -> Result<(), EscrowError> {
    if order.settled {
        Err(EscrowError::InvalidState {
            order_id: order.id,
            status: order.status,
            operation,
        })
    } else {
        Ok(())
    }
}
