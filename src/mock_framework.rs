//! # Mock Framework
//!
//! Utilities for testing [`LedgerClient`] in isolation.
//!
//! Use [`create_mock_client`] to get a client and the receiving end of its
//! mailbox, then helpers like [`expect_create_order`] to assert on what the
//! client sent and to script the reply.

use tokio::sync::{broadcast, mpsc};

use crate::clients::LedgerClient;
use crate::domain::{Address, Amount, OrderCreate, OrderDetails, OrderId};
use crate::error::EscrowError;
use crate::messages::{LedgerRequest, ServiceResponse};

/// Creates a client whose requests land on the returned receiver instead of a
/// running `LedgerService`.
pub fn create_mock_client(buffer_size: usize) -> (LedgerClient, mpsc::Receiver<LedgerRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (events, _) = broadcast::channel(16);
    (LedgerClient::new(sender, events), receiver)
}

/// Next message must be a CreateOrder request
pub async fn expect_create_order(
    receiver: &mut mpsc::Receiver<LedgerRequest>,
) -> Option<(Address, OrderCreate, ServiceResponse<OrderId, EscrowError>)> {
    match receiver.recv().await {
        Some(LedgerRequest::CreateOrder { caller, create, respond_to }) => Some((caller, create, respond_to)),
        _ => None,
    }
}

/// Next message must be a ConfirmDelivery request
pub async fn expect_confirm_delivery(
    receiver: &mut mpsc::Receiver<LedgerRequest>,
) -> Option<(Address, OrderId, ServiceResponse<Amount, EscrowError>)> {
    match receiver.recv().await {
        Some(LedgerRequest::ConfirmDelivery { caller, order_id, respond_to }) => Some((caller, order_id, respond_to)),
        _ => None,
    }
}

/// Next message must be a GetOrderDetails request
pub async fn expect_get_order_details(
    receiver: &mut mpsc::Receiver<LedgerRequest>,
) -> Option<(OrderId, ServiceResponse<OrderDetails, EscrowError>)> {
    match receiver.recv().await {
        Some(LedgerRequest::GetOrderDetails { order_id, respond_to }) => Some((order_id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Role;

    #[tokio::test]
    async fn test_mock_client_create_order() {
        let (client, mut receiver) = create_mock_client(10);
        let consumer = Address::new("0xc0ffee").unwrap();
        let producer = Address::new("0xfab").unwrap();

        let task = {
            let consumer = consumer.clone();
            let producer = producer.clone();
            tokio::spawn(async move {
                let create = OrderCreate::new(producer, 1, "Smartphone", Amount::from_wei(5));
                client.create_order(consumer, create).await
            })
        };

        let (caller, create, responder) = expect_create_order(&mut receiver)
            .await
            .expect("Expected CreateOrder request");
        assert_eq!(caller, consumer);
        assert_eq!(create.producer, producer);
        assert_eq!(create.attached_funds, Amount::from_wei(5));
        responder.send(Ok(0)).unwrap();

        assert_eq!(task.await.unwrap(), Ok(0));
    }

    #[tokio::test]
    async fn test_mock_client_passes_ledger_errors_through() {
        let (client, mut receiver) = create_mock_client(10);
        let stranger = Address::new("0xbad").unwrap();

        let task = {
            let stranger = stranger.clone();
            tokio::spawn(async move { client.confirm_delivery(stranger, 3).await })
        };

        let (caller, order_id, responder) = expect_confirm_delivery(&mut receiver)
            .await
            .expect("Expected ConfirmDelivery request");
        assert_eq!(order_id, 3);
        let denied = EscrowError::Unauthorized {
            order_id,
            caller,
            required: Role::Consumer,
        };
        responder.send(Err(denied.clone())).unwrap();

        assert_eq!(task.await.unwrap(), Err(denied));
    }

    #[tokio::test]
    async fn test_dropped_service_is_unavailable() {
        let (client, receiver) = create_mock_client(10);
        drop(receiver);

        let err = client.order_count().await.unwrap_err();
        assert!(matches!(err, EscrowError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_unavailable() {
        let (client, mut receiver) = create_mock_client(10);
        let task = tokio::spawn(async move { client.get_order_details(0).await });

        let (_, responder) = expect_get_order_details(&mut receiver)
            .await
            .expect("Expected GetOrderDetails request");
        drop(responder);

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, EscrowError::ServiceUnavailable(_)));
    }
}
