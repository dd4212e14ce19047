//! Free-tier usage counters
//!
//! Anonymous visitors get a small number of uses per metered feature. The
//! count lives in the same key/value storage as the session, so it survives
//! restarts. Signed-in users are metered by the backend instead.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, Storage, StorageError};

/// A feature whose anonymous use is capped locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteredFeature {
    SymptomCheck,
    #[serde(rename = "chat")]
    ChatMessage,
    MedicationQa,
}

impl MeteredFeature {
    /// All metered features
    pub fn all() -> &'static [MeteredFeature] {
        &[
            MeteredFeature::SymptomCheck,
            MeteredFeature::ChatMessage,
            MeteredFeature::MedicationQa,
        ]
    }

    /// Free uses before sign-in is required
    pub fn free_limit(&self) -> u32 {
        match self {
            MeteredFeature::SymptomCheck => 10,
            MeteredFeature::ChatMessage => 2,
            MeteredFeature::MedicationQa => 5,
        }
    }

    /// Storage key of the counter
    pub fn storage_key(&self) -> &'static str {
        match self {
            MeteredFeature::SymptomCheck => "symptomCheckCount",
            MeteredFeature::ChatMessage => "chatMessageCount",
            MeteredFeature::MedicationQa => "medicationQACount",
        }
    }

    /// Feature name understood by the backend's feature endpoints
    pub fn api_name(&self) -> &'static str {
        match self {
            MeteredFeature::SymptomCheck => "symptom_check",
            MeteredFeature::ChatMessage => "chat",
            MeteredFeature::MedicationQa => "medication_qa",
        }
    }
}

impl fmt::Display for MeteredFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Persistent counter for one metered feature
#[derive(Clone)]
pub struct UsageCounter {
    feature: MeteredFeature,
    storage: Arc<dyn Storage>,
}

impl UsageCounter {
    pub fn new(feature: MeteredFeature, storage: Arc<dyn Storage>) -> Self {
        Self { feature, storage }
    }

    pub fn feature(&self) -> MeteredFeature {
        self.feature
    }

    /// Uses recorded so far; a missing or garbled value counts as zero
    pub fn count(&self) -> Result<u32, StorageError> {
        let raw = self.storage.get(self.feature.storage_key())?;
        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    /// Free uses left, never negative
    pub fn remaining(&self) -> Result<u32, StorageError> {
        Ok(self.feature.free_limit().saturating_sub(self.count()?))
    }

    pub fn is_exhausted(&self) -> Result<bool, StorageError> {
        Ok(self.count()? >= self.feature.free_limit())
    }

    /// Records one use and returns the new count
    pub fn increment(&self) -> Result<u32, StorageError> {
        let count = self.count()?.saturating_add(1);
        self.storage
            .set(self.feature.storage_key(), &count.to_string())?;

        if count >= self.feature.free_limit() {
            tracing::info!("Free {} uses exhausted ({})", self.feature, count);
        } else {
            tracing::debug!("{} usage: {}/{}", self.feature, count, self.feature.free_limit());
        }
        Ok(count)
    }

    pub fn reset(&self) -> Result<(), StorageError> {
        self.storage.remove(self.feature.storage_key())
    }

    /// Drops the local counter when a session is active
    ///
    /// Returns true if a session was found.
    pub fn sync_with_session(&self, credentials: &CredentialStore) -> Result<bool, StorageError> {
        if credentials.has_session()? {
            self.reset()?;
            return Ok(true);
        }
        Ok(false)
    }
}

impl fmt::Debug for UsageCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageCounter")
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}
