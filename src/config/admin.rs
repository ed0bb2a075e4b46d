//! Admin API configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Admin API configuration
///
/// Operator endpoints (bulk sync, payments listing) are gated by a static
/// API key supplied in the `x-admin-api-key` header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Static admin API key
    pub api_key: String,
}

impl AdminConfig {
    /// Validate admin configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("ADMIN_API_KEY"));
        }
        Ok(())
    }
}
