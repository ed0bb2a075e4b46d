//! StartCheckoutHandler - initializes a gateway checkout for a plan.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Plan};
use crate::ports::{CheckoutIntent, InitializeCheckoutRequest, PaymentGateway};

/// Command to start a checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    /// Requested plan name.
    pub plan: String,
    /// Purchaser email.
    pub email: String,
    /// Internal user id, when the purchaser is logged in.
    pub user_id: Option<String>,
}

/// Handler for checkout initialization.
pub struct StartCheckoutHandler {
    gateway: Arc<dyn PaymentGateway>,
    /// Public site URL the gateway redirects back to.
    site_url: String,
}

impl StartCheckoutHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, site_url: impl Into<String>) -> Self {
        Self {
            gateway,
            site_url: site_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<CheckoutIntent, BillingError> {
        let plan =
            Plan::parse(&cmd.plan).ok_or_else(|| BillingError::unknown_plan(&cmd.plan))?;
        let price_ngn = plan.checkout_price_ngn().ok_or_else(|| {
            BillingError::invalid_request("plan", "not purchasable via checkout")
        })?;

        if cmd.email.is_empty() {
            return Err(BillingError::invalid_request("email", "required"));
        }

        let request = InitializeCheckoutRequest {
            email: cmd.email.to_lowercase(),
            plan,
            // NGN to kobo
            amount_minor_units: price_ngn * 100,
            user_id: cmd.user_id,
            callback_url: format!("{}/checkout/success", self.site_url),
        };

        let intent = self.gateway.initialize_checkout(request).await?;
        tracing::info!(
            reference = %intent.reference,
            plan = %plan,
            "Checkout initialized"
        );
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paystack::MockPaystackGateway;

    fn handler(gateway: MockPaystackGateway) -> StartCheckoutHandler {
        StartCheckoutHandler::new(Arc::new(gateway), "https://fxmentor.example")
    }

    #[tokio::test]
    async fn initializes_checkout_for_vip() {
        let gateway = MockPaystackGateway::new();
        let h = handler(gateway);

        let intent = h
            .handle(StartCheckoutCommand {
                plan: "vip".to_string(),
                email: "Buyer@X.com".to_string(),
                user_id: Some("user-1".to_string()),
            })
            .await
            .unwrap();

        assert!(!intent.reference.is_empty());
        assert!(intent.authorization_url.starts_with("https://"));
    }

    #[tokio::test]
    async fn converts_plan_price_to_kobo_and_lowercases_email() {
        let gateway = MockPaystackGateway::new();
        let requests = gateway.initialize_requests();
        let h = handler(gateway);

        h.handle(StartCheckoutCommand {
            plan: "premium".to_string(),
            email: "Buyer@X.com".to_string(),
            user_id: None,
        })
        .await
        .unwrap();

        let seen = requests.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].amount_minor_units, 9_000_000);
        assert_eq!(seen[0].email, "buyer@x.com");
        assert_eq!(
            seen[0].callback_url,
            "https://fxmentor.example/checkout/success"
        );
    }

    #[tokio::test]
    async fn unknown_plan_is_rejected() {
        let h = handler(MockPaystackGateway::new());

        let result = h
            .handle(StartCheckoutCommand {
                plan: "gold".to_string(),
                email: "a@x.com".to_string(),
                user_id: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::UnknownPlan(_))));
    }

    #[tokio::test]
    async fn lifetime_plan_is_not_checkoutable() {
        let h = handler(MockPaystackGateway::new());

        let result = h
            .handle(StartCheckoutCommand {
                plan: "lifetime".to_string(),
                email: "a@x.com".to_string(),
                user_id: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let h = handler(MockPaystackGateway::new());

        let result = h
            .handle(StartCheckoutCommand {
                plan: "vip".to_string(),
                email: String::new(),
                user_id: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::InvalidRequest { .. })));
    }
}
