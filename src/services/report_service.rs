//! Console reports for the customer listing and the active-subscription summary.
//!
//! Pages are fetched completely before anything is written, so a failed
//! request never leaves a half-printed report behind.

use crate::error::AppResult;
use crate::external::CustomerDirectory;
use crate::models::*;
use crate::services::subscription_service::{SubscriptionAggregator, group_by_product, renewal_stats};
use crate::utils::days_remaining;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

#[derive(Clone)]
pub struct ReportService<C> {
    directory: C,
    project_id: String,
}

impl<C: CustomerDirectory> ReportService<C> {
    pub fn new(directory: C, project_id: impl Into<String>) -> Self {
        Self {
            directory,
            project_id: project_id.into(),
        }
    }

    pub async fn fetch_page(&self, params: &ListCustomersParams) -> AppResult<CustomerPage> {
        self.directory.list_customers(&self.project_id, params).await
    }

    /// Lists the customers of one page with their entitlements.
    pub async fn subscribers<W: Write>(
        &self,
        out: &mut W,
        params: &ListCustomersParams,
    ) -> AppResult<()> {
        let page = self.fetch_page(params).await?;
        write_subscriber_list(out, &page)?;
        Ok(())
    }

    /// Aggregates one page and prints the active-subscription report.
    pub async fn active_subscriptions<W: Write>(
        &self,
        out: &mut W,
        params: &ListCustomersParams,
        now: DateTime<Utc>,
    ) -> AppResult<SubscriptionSummary> {
        let page = self.fetch_page(params).await?;
        let summary = SubscriptionAggregator::new(now).aggregate(&page.items);
        write_active_report(out, &page, &summary, now)?;
        Ok(summary)
    }
}

fn fmt_ts(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "N/A".to_string())
}

fn yes_no(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Unknown",
    }
}

pub fn write_subscriber_list<W: Write>(out: &mut W, page: &CustomerPage) -> std::io::Result<()> {
    writeln!(out, "Total subscribers found: {}", page.items.len())?;
    writeln!(out, "Has more pages: {}", page.more_available())?;

    if page.items.is_empty() {
        writeln!(out, "No subscribers found.")?;
        return Ok(());
    }

    writeln!(out, "\n--- Subscriber List ---\n")?;
    for (index, customer) in page.items.iter().enumerate() {
        writeln!(out, "{}. Customer ID: {}", index + 1, customer.id)?;
        writeln!(
            out,
            "   App User ID: {}",
            customer.app_user_id.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A")
        )?;
        writeln!(out, "   Created: {}", fmt_ts(customer.created_at))?;
        writeln!(out, "   Last Seen: {}", fmt_ts(customer.last_seen_at))?;

        if !customer.entitlements.is_empty() {
            writeln!(out, "   Active Entitlements:")?;
            for (key, entitlement) in &customer.entitlements {
                match entitlement.expires_at {
                    Some(at) => writeln!(out, "     - {key}: expires {}", fmt_ts(Some(at)))?,
                    None => writeln!(out, "     - {key}: lifetime")?,
                }
            }
        }
        writeln!(out)?;
    }

    if let Some(cursor) = page.next_cursor() {
        writeln!(out, "\nTo fetch the next page, use --starting-after \"{cursor}\"")?;
    }
    Ok(())
}

pub fn write_active_report<W: Write>(
    out: &mut W,
    page: &CustomerPage,
    summary: &SubscriptionSummary,
    now: DateTime<Utc>,
) -> std::io::Result<()> {
    if page.items.is_empty() {
        writeln!(out, "No customers found.")?;
        return Ok(());
    }

    writeln!(out, "Found {} customers\n", page.items.len())?;
    writeln!(out, "=== SUBSCRIPTION SUMMARY ===\n")?;
    writeln!(out, "Total Active Subscriptions: {}", summary.active_count)?;
    writeln!(out, "Lifetime Purchases: {}", summary.lifetime_count)?;
    writeln!(out, "Expired Subscriptions: {}", summary.expired_count)?;
    writeln!(out, "Total Active (including lifetime): {}\n", summary.total_active())?;

    if !summary.views.is_empty() {
        writeln!(out, "=== ACTIVE SUBSCRIPTIONS ===\n")?;
        for (index, view) in summary.views.iter().enumerate() {
            writeln!(out, "{}. Customer: {}", index + 1, view.app_user_id)?;
            writeln!(
                out,
                "   Product: {}",
                view.product().unwrap_or("N/A")
            )?;
            match view.expires_at {
                Some(at) => {
                    writeln!(
                        out,
                        "   Expires: {} ({} days remaining)",
                        fmt_ts(Some(at)),
                        days_remaining(at, now)
                    )?;
                    writeln!(out, "   Will Renew: {}", yes_no(view.will_renew))?;
                }
                None => writeln!(out, "   Type: Lifetime Purchase")?,
            }
            if let Some(store) = view.store() {
                writeln!(out, "   Store: {store}")?;
            }
            if !view.entitlements.is_empty() {
                writeln!(out, "   Entitlements: {}", view.entitlements.join(", "))?;
            }
            writeln!(out)?;
        }

        writeln!(out, "=== SUBSCRIPTIONS BY PRODUCT ===\n")?;
        for (product, count) in group_by_product(&summary.views) {
            writeln!(out, "{product}: {count} subscribers")?;
        }

        let stats = renewal_stats(&summary.views);
        writeln!(out, "\n=== RENEWAL STATUS ===\n")?;
        writeln!(out, "Will Renew: {}", stats.will_renew)?;
        writeln!(out, "Will Not Renew: {}", stats.will_not_renew)?;
        writeln!(out, "Unknown/Lifetime: {}", stats.unknown)?;
        if let Some(rate) = stats.churn_rate {
            writeln!(out, "\nPredicted Churn Rate: {rate:.2}%")?;
        }
    }

    if page.more_available() {
        writeln!(
            out,
            "\nNote: There are more customers available. Pass --starting-after to fetch the next page."
        )?;
    }
    Ok(())
}
