//! FX Mentor Billing - Payment reconciliation and entitlement service.
//!
//! This crate receives Paystack webhook notifications for the FX Mentor
//! platform, verifies their authenticity, records payments idempotently,
//! and applies access-tier entitlements to user profiles.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
