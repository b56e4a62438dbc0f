use crate::config::RevenueCatConfig;
use crate::error::{AppError, AppResult};
use crate::models::{CustomerPage, ListCustomersParams};
use crate::utils::{RetryPolicy, retry_with_backoff};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Source of paginated customer records.
pub trait CustomerDirectory {
    fn list_customers(
        &self,
        project_id: &str,
        params: &ListCustomersParams,
    ) -> impl Future<Output = AppResult<CustomerPage>> + Send;
}

#[derive(Clone)]
pub struct RevenueCatClient {
    client: Client,
    config: RevenueCatConfig,
    retry: RetryPolicy,
}

impl RevenueCatClient {
    pub fn new(config: RevenueCatConfig, retry: RetryPolicy) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self::with_timeout(config, retry, timeout)
    }

    /// Same as `new` but with an explicit request timeout.
    pub fn with_timeout(
        config: RevenueCatConfig,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("subscriber-report/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    fn customers_url(&self, project_id: &str) -> String {
        format!(
            "{}/projects/{}/customers",
            self.config.base_url.trim_end_matches('/'),
            project_id
        )
    }

    async fn fetch_page(&self, url: &str, params: &ListCustomersParams) -> AppResult<CustomerPage> {
        log::debug!("GET {url} limit={} starting_after={:?}", params.get_limit(), params.starting_after);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params.to_query())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("GET {url}"))
                } else {
                    AppError::ReqwestError(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(format!("reading body of GET {url}"))
            } else {
                AppError::ReqwestError(e)
            }
        })?;

        if !status.is_success() {
            log::debug!("List customers failed: HTTP {}: {}", status.as_u16(), body);
            return Err(AppError::from_status(status, body));
        }

        let page: CustomerPage = serde_json::from_str(&body)?;
        log::debug!(
            "Received {} customers, more available: {}",
            page.items.len(),
            page.more_available()
        );
        Ok(page)
    }
}

impl CustomerDirectory for RevenueCatClient {
    async fn list_customers(
        &self,
        project_id: &str,
        params: &ListCustomersParams,
    ) -> AppResult<CustomerPage> {
        let url = self.customers_url(project_id);
        retry_with_backoff(&self.retry, || self.fetch_page(&url, params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customers_url_trims_trailing_slash() {
        let config = RevenueCatConfig {
            api_key: "sk_test".into(),
            project_id: "proj".into(),
            base_url: "https://api.revenuecat.com/v2/".into(),
            ..Default::default()
        };
        let client = RevenueCatClient::new(config, RetryPolicy::none()).unwrap();
        assert_eq!(
            client.customers_url("proj_1"),
            "https://api.revenuecat.com/v2/projects/proj_1/customers"
        );
    }
}
