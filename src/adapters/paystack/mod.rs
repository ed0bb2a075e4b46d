//! Paystack gateway adapters.

mod gateway;
mod mock_gateway;

pub use gateway::PaystackGateway;
pub use mock_gateway::MockPaystackGateway;
