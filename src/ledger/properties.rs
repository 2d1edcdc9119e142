//! Property tests over random operation sequences.

use std::collections::HashMap;

use proptest::prelude::*;

use super::{EscrowLedger, ManualClock};
use crate::domain::{Address, Amount, OrderCreate, OrderId, OrderStatus};

#[derive(Debug, Clone)]
enum Op {
    Create { by: usize, producer: usize, price: u8, overpay: bool },
    Ship { by: usize, order: u8 },
    Deliver { by: usize, order: u8 },
    Cancel { by: usize, order: u8 },
    Specify { by: usize, order: u8, at: u32 },
    Deposit { to: usize, huge: bool },
    Tick(u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..3usize, 0..20u8, any::<bool>()).prop_map(|(by, producer, price, overpay)| Op::Create {
            by,
            producer,
            price,
            overpay
        }),
        (0..3usize, 0..8u8).prop_map(|(by, order)| Op::Ship { by, order }),
        (0..3usize, 0..8u8).prop_map(|(by, order)| Op::Deliver { by, order }),
        (0..3usize, 0..8u8).prop_map(|(by, order)| Op::Cancel { by, order }),
        (0..3usize, 0..8u8, any::<u32>()).prop_map(|(by, order, at)| Op::Specify { by, order, at }),
        (0..3usize, prop::bool::weighted(0.2)).prop_map(|(to, huge)| Op::Deposit { to, huge }),
        any::<u16>().prop_map(Op::Tick),
    ]
}

fn principals() -> Vec<Address> {
    ["0xaaaa", "0xbbbb", "0xcccc"]
        .iter()
        .map(|raw| Address::new(raw).unwrap())
        .collect()
}

fn total_value(ledger: &EscrowLedger<ManualClock>, who: &[Address]) -> Option<Amount> {
    who.iter()
        .try_fold(ledger.custody_balance(), |total, addr| total.checked_add(ledger.balance_of(addr)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Custody always equals the open orders' prices, value is never created or
    /// destroyed (even with wallets near `u128::MAX`), status only moves forward,
    /// and each order pays out at most once (exactly once when terminal).
    #[test]
    fn prop_escrow_invariants_hold(ops in prop::collection::vec(arb_op(), 1..80)) {
        let clock = ManualClock::new(1_000);
        let mut ledger = EscrowLedger::new(clock.clone());
        let who = principals();
        for addr in &who {
            ledger.deposit(addr, Amount::from_wei(100)).unwrap();
        }
        let mut supply = total_value(&ledger, &who).unwrap();
        let mut last_rank: HashMap<OrderId, u8> = HashMap::new();

        for op in ops {
            let before_events = ledger.events().len();
            let before_count = ledger.order_count();
            let before_custody = ledger.custody_balance();

            let result = match op {
                Op::Create { by, producer, price, overpay } => {
                    let price = Amount::from_wei(price as u128);
                    let attached = if overpay { price.saturating_add(Amount::from_wei(1)) } else { price };
                    let create = OrderCreate::new(who[producer].clone(), 1, "Widget", price)
                        .with_attached_funds(attached);
                    ledger.create_order(&who[by], create).map(|_| ())
                }
                Op::Ship { by, order } => ledger.confirm_shipment(&who[by], order as OrderId),
                Op::Deliver { by, order } => ledger.confirm_delivery(&who[by], order as OrderId).map(|_| ()),
                Op::Cancel { by, order } => ledger.cancel_order(&who[by], order as OrderId).map(|_| ()),
                Op::Specify { by, order, at } => ledger.specify_delivery_date(&who[by], order as OrderId, at as u64),
                Op::Deposit { to, huge } => {
                    let amount = if huge { Amount::from_wei(u128::MAX - 50) } else { Amount::from_wei(25) };
                    ledger.deposit(&who[to], amount).map(|_| {
                        supply = supply.checked_add(amount).unwrap();
                    })
                }
                Op::Tick(secs) => {
                    clock.advance(secs as u64);
                    Ok(())
                }
            };

            if result.is_err() {
                prop_assert_eq!(ledger.events().len(), before_events);
                prop_assert_eq!(ledger.order_count(), before_count);
                prop_assert_eq!(ledger.custody_balance(), before_custody);
            }

            prop_assert!(ledger.verify_conservation());
            prop_assert_eq!(total_value(&ledger, &who), Some(supply));
            prop_assert_eq!(ledger.total_supply(), supply);

            for id in 0..ledger.order_count() {
                let details = ledger.order_details(id).unwrap();
                let rank = details.status.rank();
                let previous = last_rank.insert(id, rank).unwrap_or(0);
                prop_assert!(rank >= previous);
                prop_assert_ne!(details.status, OrderStatus::Delivered);
            }
        }

        let mut payouts: HashMap<OrderId, usize> = HashMap::new();
        for event in ledger.events() {
            if event.kind.is_payout() {
                *payouts.entry(event.order_id).or_default() += 1;
            }
        }
        for id in 0..ledger.order_count() {
            let paid = payouts.get(&id).copied().unwrap_or(0);
            let terminal = ledger.order_details(id).unwrap().status.is_terminal();
            prop_assert_eq!(paid, usize::from(terminal));
        }
    }
}
