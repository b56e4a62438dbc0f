use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Bucket name for views without a product identifier.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementStatus {
    Active,
    Lifetime,
    Expired,
}

/// An active subscription derived from an entitlement or a subscription record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSubscriptionView {
    pub customer_id: String,
    pub app_user_id: String,
    pub subscription_id: Option<String>,
    pub product_identifier: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub will_renew: Option<bool>,
    pub store: Option<String>,
    pub entitlements: Vec<String>,
}

impl ActiveSubscriptionView {
    /// Product identifier, with an empty string read as missing.
    pub fn product(&self) -> Option<&str> {
        self.product_identifier.as_deref().filter(|p| !p.is_empty())
    }

    pub fn store(&self) -> Option<&str> {
        self.store.as_deref().filter(|s| !s.is_empty())
    }

    pub fn product_bucket(&self) -> &str {
        self.product().unwrap_or(UNKNOWN_PRODUCT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionSummary {
    pub views: Vec<ActiveSubscriptionView>,
    pub active_count: usize,
    pub lifetime_count: usize,
    pub expired_count: usize,
}

impl SubscriptionSummary {
    pub fn total_active(&self) -> usize {
        self.active_count + self.lifetime_count
    }
}

/// Per-product view counts, in first-seen order.
pub type ProductGroups = IndexMap<String, usize>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenewalStats {
    pub will_renew: usize,
    pub will_not_renew: usize,
    pub unknown: usize,
    /// Percentage, two decimals. Only set when someone is not renewing.
    pub churn_rate: Option<f64>,
}
