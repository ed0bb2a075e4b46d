//! Mock payment gateway for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CheckoutIntent, GatewayError, GatewayTransaction, InitializeCheckoutRequest, PaymentGateway,
};

/// In-memory stand-in for the Paystack API.
///
/// Checkouts get sequential references; verification answers from a
/// preloaded transaction map.
pub struct MockPaystackGateway {
    transactions: Mutex<HashMap<String, GatewayTransaction>>,
    initialize_requests: Arc<Mutex<Vec<InitializeCheckoutRequest>>>,
    counter: AtomicU64,
}

impl MockPaystackGateway {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
            initialize_requests: Arc::new(Mutex::new(Vec::new())),
            counter: AtomicU64::new(0),
        }
    }

    /// Creates a mock that will answer `verify_transaction` with the given
    /// transaction.
    pub fn with_transaction(transaction: GatewayTransaction) -> Self {
        let mock = Self::new();
        mock.transactions
            .lock()
            .unwrap()
            .insert(transaction.reference.clone(), transaction);
        mock
    }

    /// Preloads an additional transaction.
    pub fn insert_transaction(&self, transaction: GatewayTransaction) {
        self.transactions
            .lock()
            .unwrap()
            .insert(transaction.reference.clone(), transaction);
    }

    /// Handle to the initialize requests seen so far, for assertions.
    pub fn initialize_requests(&self) -> Arc<Mutex<Vec<InitializeCheckoutRequest>>> {
        self.initialize_requests.clone()
    }
}

impl Default for MockPaystackGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaystackGateway {
    async fn initialize_checkout(
        &self,
        request: InitializeCheckoutRequest,
    ) -> Result<CheckoutIntent, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let reference = format!("mock_ref_{}", n);
        self.initialize_requests.lock().unwrap().push(request);

        Ok(CheckoutIntent {
            authorization_url: format!("https://checkout.paystack.com/{}", reference),
            reference,
        })
    }

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<GatewayTransaction, GatewayError> {
        self.transactions
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(reference))
    }
}
