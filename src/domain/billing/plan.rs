//! Paid plan definitions.
//!
//! Represents the access plans sold on the FX Mentor platform. Prices are in
//! NGN, converted to kobo (minor units) when a checkout is initialized.

use serde::{Deserialize, Serialize};

use super::entitlement::EntitlementChange;
use super::profile::Role;

/// A recognized paid plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Monthly premium access: signals, history, bot access.
    Premium,

    /// Monthly VIP access: everything in premium plus group mentorship.
    Vip,

    /// One-off lifetime grant.
    Lifetime,
}

impl Plan {
    /// Parses a plan hint from gateway metadata, case-insensitively.
    ///
    /// Returns `None` for unrecognized hints; callers treat that as
    /// "record the payment, change no entitlement".
    pub fn parse(hint: &str) -> Option<Self> {
        match hint.to_ascii_lowercase().as_str() {
            "premium" => Some(Plan::Premium),
            "vip" => Some(Plan::Vip),
            "lifetime" => Some(Plan::Lifetime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Premium => "premium",
            Plan::Vip => "vip",
            Plan::Lifetime => "lifetime",
        }
    }

    /// The entitlement a successful payment for this plan grants.
    pub fn entitlement(&self) -> EntitlementChange {
        match self {
            Plan::Premium => EntitlementChange::SetRole(Role::Premium),
            Plan::Vip => EntitlementChange::SetRole(Role::Vip),
            Plan::Lifetime => EntitlementChange::GrantLifetime,
        }
    }

    /// Checkout price in NGN for plans that can be bought through the
    /// standard checkout flow. Lifetime access is granted by operators, not
    /// sold at a fixed price.
    pub fn checkout_price_ngn(&self) -> Option<i64> {
        match self {
            Plan::Premium => Some(90_000),
            Plan::Vip => Some(150_000),
            Plan::Lifetime => None,
        }
    }

    /// Dashboard path the purchaser is redirected to after checkout.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Plan::Premium => "/dashboard/premium",
            Plan::Vip => "/dashboard/vip",
            Plan::Lifetime => "/dashboard",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_known_plans() {
        assert_eq!(Plan::parse("vip"), Some(Plan::Vip));
        assert_eq!(Plan::parse("premium"), Some(Plan::Premium));
        assert_eq!(Plan::parse("lifetime"), Some(Plan::Lifetime));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Plan::parse("VIP"), Some(Plan::Vip));
        assert_eq!(Plan::parse("Lifetime"), Some(Plan::Lifetime));
    }

    #[test]
    fn parse_rejects_unknown_plans() {
        assert_eq!(Plan::parse("unknown_tier"), None);
        assert_eq!(Plan::parse(""), None);
        assert_eq!(Plan::parse("free"), None);
    }

    #[test]
    fn entitlement_mapping_is_fixed() {
        assert_eq!(
            Plan::Vip.entitlement(),
            EntitlementChange::SetRole(Role::Vip)
        );
        assert_eq!(
            Plan::Premium.entitlement(),
            EntitlementChange::SetRole(Role::Premium)
        );
        assert_eq!(Plan::Lifetime.entitlement(), EntitlementChange::GrantLifetime);
    }

    #[test]
    fn only_subscription_plans_have_checkout_prices() {
        assert_eq!(Plan::Premium.checkout_price_ngn(), Some(90_000));
        assert_eq!(Plan::Vip.checkout_price_ngn(), Some(150_000));
        assert_eq!(Plan::Lifetime.checkout_price_ngn(), None);
    }

    #[test]
    fn dashboard_paths() {
        assert_eq!(Plan::Vip.dashboard_path(), "/dashboard/vip");
        assert_eq!(Plan::Premium.dashboard_path(), "/dashboard/premium");
        assert_eq!(Plan::Lifetime.dashboard_path(), "/dashboard");
    }
}
