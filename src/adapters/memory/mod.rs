//! In-memory adapters for the storage ports.
//!
//! Used by the test suites and for running the service locally without a
//! database. Each store serializes access through a single mutex, which
//! makes the duplicate-check-then-insert in the ledger atomic the same way
//! the unique constraint does in PostgreSQL.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::{
    PaymentEvent, PaymentRecord, Subscription, SubscriptionStatus, UserProfile,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{
    AuditEntry, AuditLog, EntitlementPatch, InsertOutcome, PaymentLedger, ProfileStore,
    SubscriptionStore,
};

/// In-memory implementation of [`ProfileStore`].
pub struct InMemoryProfileStore {
    profiles: Mutex<Vec<UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
        }
    }

    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }

    /// Test accessor: fetches a profile snapshot by id.
    pub fn get(&self, id: &str) -> Option<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned()
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DomainError> {
        let needle = email.to_lowercase();
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email.to_lowercase() == needle)
            .cloned())
    }

    async fn update_entitlement(
        &self,
        id: &UserId,
        patch: EntitlementPatch,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| DomainError::new(ErrorCode::ProfileNotFound, id.to_string()))?;

        if let Some(role) = patch.role {
            profile.role = role;
        }
        if let Some(lifetime) = patch.lifetime {
            profile.lifetime = lifetime;
        }
        Ok(())
    }
}

/// In-memory implementation of [`PaymentLedger`].
pub struct InMemoryPaymentLedger {
    events: Mutex<Vec<PaymentEvent>>,
    records: Mutex<Vec<PaymentRecord>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Test accessor: number of appended raw events.
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Test accessor: number of inserted records.
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Test accessor: snapshot of all records.
    pub fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for InMemoryPaymentLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn append_event(&self, event: &PaymentEvent) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn insert_record(&self, record: &PaymentRecord) -> Result<InsertOutcome, DomainError> {
        // Single lock held across check and insert mirrors the atomicity of
        // the unique constraint in the real store.
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.reference == record.reference) {
            return Ok(InsertOutcome::DuplicateSkipped);
        }
        records.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_record(&self, reference: &str) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.reference == reference)
            .cloned())
    }

    async fn list_recent_records(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// In-memory implementation of [`SubscriptionStore`].
pub struct InMemorySubscriptionStore {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
        }
    }

    /// Test accessor: snapshot of all rows.
    pub fn all(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

impl Default for InMemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn list_active(&self) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .cloned()
            .collect())
    }

    async fn upsert_active(&self, email: &str, plan: &str) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.email == email && s.plan == plan)
        {
            existing.status = SubscriptionStatus::Active;
        } else {
            subscriptions.push(Subscription::active(email, plan));
        }
        Ok(())
    }

    async fn revoke(&self, email: &str, plan: &str) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.email == email && s.plan == plan)
        {
            existing.status = SubscriptionStatus::Revoked;
        }
        Ok(())
    }
}

/// In-memory implementation of [`AuditLog`].
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Test accessor: snapshot of all entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
