//! External geolocation provider.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::validation::ADDRESS_PLACEHOLDER;

/// Location fields reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Cached lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoEntry {
    /// Provider answered with a location.
    Located(GeoLocation),
    /// Lookup attempted, no data available.
    Unknown,
}

impl GeoEntry {
    pub fn location(&self) -> Option<&GeoLocation> {
        match self {
            GeoEntry::Located(location) => Some(location),
            GeoEntry::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, GeoEntry::Unknown)
    }
}

impl fmt::Display for GeoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoEntry::Located(loc) => {
                let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
                write!(f, "{}/{}/{}", part(&loc.country), part(&loc.region), part(&loc.city))
            }
            GeoEntry::Unknown => f.write_str("unknown"),
        }
    }
}

/// Why a provider call produced no location.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed provider body: {0}")]
    Malformed(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of location data for a client address.
pub trait GeoProvider: Send + Sync + 'static {
    fn fetch(&self, address: &str) -> impl Future<Output = Result<GeoLocation, LookupError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ProviderBody {
    country: String,
    region: String,
    city: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl From<ProviderBody> for GeoLocation {
    fn from(body: ProviderBody) -> Self {
        Self {
            country: non_empty(body.country),
            region: non_empty(body.region),
            city: non_empty(body.city),
        }
    }
}

/// HTTP JSON provider addressed by a URL template.
#[derive(Debug, Clone)]
pub struct HttpGeoProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGeoProvider {
    /// `endpoint` must contain `{address}`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn url_for(&self, address: &str) -> String {
        self.endpoint.replace(ADDRESS_PLACEHOLDER, address)
    }
}

impl GeoProvider for HttpGeoProvider {
    async fn fetch(&self, address: &str) -> Result<GeoLocation, LookupError> {
        let response = self.client.get(self.url_for(address)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ProviderBody =
            serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;
        Ok(parsed.into())
    }
}
