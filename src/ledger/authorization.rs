use std::fmt;

use crate::domain::{Address, Order};
use crate::error::EscrowError;

/// The two counterparties of an escrowed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Consumer,
    Producer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Consumer => f.write_str("consumer"),
            Role::Producer => f.write_str("producer"),
        }
    }
}

/// Whether `caller` holds `role` on `order`.
pub fn has_role(caller: &Address, order: &Order, role: Role) -> bool {
    match role {
        Role::Consumer => &order.consumer == caller,
        Role::Producer => &order.producer == caller,
    }
}

/// Role gate shared by every mutating operation.
pub fn authorize(caller: &Address, order: &Order, role: Role) -> Result<(), EscrowError> {
    if has_role(caller, order, role) {
        Ok(())
    } else {
        Err(EscrowError::Unauthorized {
            order_id: order.id,
            caller: caller.clone(),
            required: role,
        })
    }
}
