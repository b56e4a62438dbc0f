use crate::models::*;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Classifies entitlements and subscription records of one customer page.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionAggregator {
    now: DateTime<Utc>,
}

impl SubscriptionAggregator {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    fn is_active(&self, expires_at: Option<DateTime<Utc>>) -> bool {
        expires_at.is_none_or(|at| at > self.now)
    }

    pub fn classify_entitlement(&self, entitlement: &Entitlement) -> EntitlementStatus {
        if !self.is_active(entitlement.expires_at) {
            EntitlementStatus::Expired
        } else if entitlement.expires_at.is_none() && entitlement.purchase_date.is_some() {
            EntitlementStatus::Lifetime
        } else {
            EntitlementStatus::Active
        }
    }

    /// Builds active views and counters. A (customer, product) pair already
    /// produced by an entitlement is not emitted again for a subscription record.
    pub fn aggregate(&self, customers: &[CustomerRecord]) -> SubscriptionSummary {
        let mut summary = SubscriptionSummary::default();
        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();

        for customer in customers {
            let app_user_id = customer.display_user_id();

            for (key, entitlement) in &customer.entitlements {
                match self.classify_entitlement(entitlement) {
                    EntitlementStatus::Expired => {
                        summary.expired_count += 1;
                        continue;
                    }
                    EntitlementStatus::Lifetime => summary.lifetime_count += 1,
                    EntitlementStatus::Active => summary.active_count += 1,
                }

                seen.insert((customer.id.as_str(), entitlement.product_identifier.as_deref()));
                summary.views.push(ActiveSubscriptionView {
                    customer_id: customer.id.clone(),
                    app_user_id: app_user_id.to_string(),
                    subscription_id: None,
                    product_identifier: entitlement.product_identifier.clone(),
                    expires_at: entitlement.expires_at,
                    will_renew: entitlement.will_renew,
                    store: entitlement.store.clone(),
                    entitlements: vec![key.clone()],
                });
            }

            for subscription in &customer.subscriptions {
                if !self.is_active(subscription.expires_date) {
                    continue;
                }
                let pair = (customer.id.as_str(), subscription.product_identifier.as_deref());
                if !seen.insert(pair) {
                    log::debug!(
                        "Skipping duplicate subscription {:?} for customer {}",
                        subscription.id,
                        customer.id
                    );
                    continue;
                }

                summary.active_count += 1;
                summary.views.push(ActiveSubscriptionView {
                    customer_id: customer.id.clone(),
                    app_user_id: app_user_id.to_string(),
                    subscription_id: subscription.id.clone(),
                    product_identifier: subscription.product_identifier.clone(),
                    expires_at: subscription.expires_date,
                    will_renew: subscription.will_renew,
                    store: subscription.store.clone(),
                    entitlements: Vec::new(),
                });
            }
        }

        log::info!(
            "Aggregated {} customers: {} active, {} lifetime, {} expired",
            customers.len(),
            summary.active_count,
            summary.lifetime_count,
            summary.expired_count
        );
        summary
    }
}

pub fn group_by_product(views: &[ActiveSubscriptionView]) -> ProductGroups {
    let mut groups = ProductGroups::new();
    for view in views {
        *groups.entry(view.product_bucket().to_string()).or_insert(0) += 1;
    }
    groups
}

pub fn renewal_stats(views: &[ActiveSubscriptionView]) -> RenewalStats {
    let mut stats = RenewalStats::default();
    for view in views {
        match view.will_renew {
            Some(true) => stats.will_renew += 1,
            Some(false) => stats.will_not_renew += 1,
            None => stats.unknown += 1,
        }
    }
    stats.churn_rate = churn_rate(stats.will_renew, stats.will_not_renew);
    stats
}

/// `not_renew / (renew + not_renew)` as a percentage rounded to two decimals.
pub fn churn_rate(will_renew: usize, will_not_renew: usize) -> Option<f64> {
    if will_not_renew == 0 {
        return None;
    }
    let pct = will_not_renew as f64 / (will_renew + will_not_renew) as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}
