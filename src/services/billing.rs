//! Subscription billing

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

const STATUS_PATH: &str = "billing/subscription-status/";
const CANCEL_PATH: &str = "billing/cancel-subscription/";
const CREATE_PATH: &str = "billing/create-subscription/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

/// Current plan of the signed-in user as reported by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl SubscriptionStatus {
    /// True for any plan other than the free tier
    pub fn is_paid(&self) -> bool {
        matches!(self.plan.as_deref(), Some(plan) if plan != "free")
    }
}

/// Checkout session to hand to the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
struct CreateSubscription<'a> {
    plan: &'a str,
    billing_cycle: BillingCycle,
}

#[derive(Debug, Clone)]
pub struct BillingService {
    api: Arc<ApiClient>,
}

impl BillingService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn subscription_status(&self) -> Result<SubscriptionStatus, ApiError> {
        self.api.get_json(STATUS_PATH).await
    }

    /// Cancels the paid subscription; the account falls back to the free plan
    pub async fn cancel_subscription(&self) -> Result<(), ApiError> {
        self.api.post(CANCEL_PATH, &serde_json::json!({})).await?;
        tracing::info!("Subscription cancelled");
        Ok(())
    }

    /// Starts a checkout for `plan` (lowercase plan name, e.g. "plus")
    pub async fn create_subscription(
        &self,
        plan: &str,
        billing_cycle: BillingCycle,
    ) -> Result<CheckoutSession, ApiError> {
        let plan = plan.to_lowercase();
        let session: CheckoutSession = self
            .api
            .post_json(CREATE_PATH, &CreateSubscription { plan: &plan, billing_cycle })
            .await?;
        tracing::debug!("Checkout session created for plan {}", plan);
        Ok(session)
    }
}
