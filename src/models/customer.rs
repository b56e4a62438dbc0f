use crate::utils::deserialize_lenient;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

/// One page of `GET /projects/{project_id}/customers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CustomerRecord>,
    #[serde(default, alias = "has_more")]
    pub has_more: bool,
    #[serde(default, alias = "next_page")]
    pub next_page: Option<String>,
}

impl CustomerPage {
    /// The API signals more data either with `has_more` or with a `next_page` cursor.
    pub fn more_available(&self) -> bool {
        self.has_more || self.next_page.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Cursor to pass as `starting_after`. `next_page` is either a bare cursor
    /// or a URL carrying it in the query string.
    pub fn next_cursor(&self) -> Option<String> {
        let next = self.next_page.as_deref().filter(|p| !p.is_empty())?;
        if !next.contains("starting_after=") {
            return Some(next.to_string());
        }
        // next_page may be a relative path; resolve it against a placeholder base
        let url = Url::parse("http://localhost/").ok()?.join(next).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "starting_after")
            .map(|(_, value)| value.into_owned())
            .filter(|cursor| !cursor.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "app_user_id")]
    pub app_user_id: Option<String>,
    #[serde(
        default,
        alias = "created_at",
        alias = "firstSeenAt",
        alias = "first_seen_at",
        deserialize_with = "deserialize_lenient"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "last_seen_at", deserialize_with = "deserialize_lenient")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entitlements: IndexMap<String, Entitlement>,
    #[serde(default, deserialize_with = "subscription_list")]
    pub subscriptions: Vec<SubscriptionRecord>,
}

impl CustomerRecord {
    /// App user id, falling back to the customer id when the API omits it.
    pub fn display_user_id(&self) -> &str {
        match self.app_user_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    #[serde(default, alias = "product_identifier")]
    pub product_identifier: Option<String>,
    #[serde(
        default,
        alias = "expires_at",
        alias = "expiresDate",
        alias = "expires_date",
        deserialize_with = "deserialize_lenient"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "purchase_date",
        alias = "purchasedAt",
        alias = "purchased_at",
        deserialize_with = "deserialize_lenient"
    )]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "will_renew")]
    pub will_renew: Option<bool>,
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "product_identifier")]
    pub product_identifier: Option<String>,
    #[serde(
        default,
        alias = "expires_date",
        alias = "expiresAt",
        alias = "expires_at",
        deserialize_with = "deserialize_lenient"
    )]
    pub expires_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "will_renew")]
    pub will_renew: Option<bool>,
    #[serde(default)]
    pub store: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a bare array, a `{"items": [...]}` list object, or null.
fn subscription_list<'de, D>(deserializer: D) -> Result<Vec<SubscriptionRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Array(Vec<SubscriptionRecord>),
        List {
            #[serde(default)]
            items: Vec<SubscriptionRecord>,
        },
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        Some(Shape::Array(items)) | Some(Shape::List { items }) => items,
        None => Vec::new(),
    })
}
