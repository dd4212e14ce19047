//! Subscription feature gating

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError, ApiRequest};

const CHECK_PATH: &str = "features/check/";
const RECORD_USAGE_PATH: &str = "features/record-usage/";

#[derive(Debug, Deserialize)]
struct AccessCheck {
    #[serde(default)]
    has_access: bool,
}

/// A product surface with its own access endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Chat,
    MentalHealth,
    Reminders,
    SymptomChecker,
    MedicationQa,
}

impl Surface {
    pub fn check_path(self) -> &'static str {
        match self {
            Surface::Chat => "chat/check-access/",
            Surface::MentalHealth => "mentalhealth/check-access/",
            Surface::Reminders => "features/check-reminder-access/",
            Surface::SymptomChecker => "features/check-symptom-access/",
            Surface::MedicationQa => "features/check-medication-qa-access/",
        }
    }
}

/// Access verdict for one surface
///
/// Usage counters are only reported by metered surfaces (chat messages,
/// medication questions).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurfaceAccess {
    #[serde(default)]
    pub has_access: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default, alias = "messages_used", alias = "questions_used")]
    pub used: Option<u32>,
    #[serde(default, alias = "messages_allowed", alias = "questions_allowed")]
    pub allowed: Option<i64>,
    #[serde(default)]
    pub is_unlimited: bool,
}

#[derive(Debug, Serialize)]
struct UsageRecord<'a> {
    feature: &'a str,
}

/// Asks the backend which plan features the signed-in user may use
///
/// Both calls are best-effort: failures are logged and never surface to the
/// caller.
#[derive(Debug, Clone)]
pub struct FeatureService {
    api: Arc<ApiClient>,
}

impl FeatureService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Returns true if the backend grants the feature; false on any error
    pub async fn check_access(&self, feature: &str) -> bool {
        let request = ApiRequest::get(CHECK_PATH).with_query("feature", feature);
        let result = match self.api.send(&request).await {
            Ok(response) => response.json::<AccessCheck>(),
            Err(e) => Err(e),
        };

        match result {
            Ok(check) => {
                tracing::debug!("Feature {} access: {}", feature, check.has_access);
                check.has_access
            }
            Err(e) => {
                tracing::error!("Error checking feature permission for {}: {}", feature, e);
                false
            }
        }
    }

    /// Asks whether the signed-in user may open a surface
    ///
    /// Unlike [`check_access`](Self::check_access) errors reach the caller,
    /// so a paywall is never shown because of a network hiccup.
    pub async fn check_surface(&self, surface: Surface) -> Result<SurfaceAccess, ApiError> {
        let access: SurfaceAccess = self.api.get_json(surface.check_path()).await?;
        tracing::debug!("{:?} access: {}", surface, access.has_access);
        Ok(access)
    }

    /// Reports one use of a feature
    pub async fn record_usage(&self, feature: &str) {
        if let Err(e) = self
            .api
            .post(RECORD_USAGE_PATH, &UsageRecord { feature })
            .await
        {
            tracing::error!("Error recording feature usage for {}: {}", feature, e);
        }
    }
}
