//! Payment gateway configuration (Paystack)

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackConfig {
    /// Paystack secret key (sk_live_... or sk_test_...).
    ///
    /// Signs webhook payloads and authorizes outbound API calls.
    pub secret_key: String,

    /// Base URL for the Paystack API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Public site URL used for checkout callbacks and success redirects
    pub site_url: String,
}

impl PaystackConfig {
    /// Check if using Paystack test mode
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using Paystack live mode
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYSTACK_SECRET_KEY"));
        }

        // Verify key prefix for safety
        if !self.secret_key.starts_with("sk_") {
            return Err(ValidationError::InvalidPaystackKey);
        }

        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(ValidationError::InvalidSiteUrl);
        }
        if *environment == Environment::Production && !self.site_url.starts_with("https://") {
            return Err(ValidationError::SiteUrlMustBeHttps);
        }

        Ok(())
    }
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_base_url: default_api_base_url(),
            site_url: String::new(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.paystack.co".to_string()
}
