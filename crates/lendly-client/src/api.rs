//! # Rental API
//!
//! Read-only access to the rental backend.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET {base}/products/{id}                      → product entity        │
//! │  GET {base}/products/{id}/availability/{YYYY-MM}                       │
//! │                                                → {"booked_dates": []}  │
//! │  GET {base}/products/{id}/rentals/{YYYY-MM}    → [{start_date, ...}]   │
//! │  GET {base}/settings/public                    → buffer settings       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`RentalDataSource`] is the seam the availability service depends on;
//! [`HttpRentalApi`] is the production implementation.

use chrono::NaiveDate;
use lendly_core::calendar::parse_api_date;
use lendly_core::{BufferSettings, RentalPeriod, RentalProduct, YearMonth};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const BODY_PREVIEW_CHARS: usize = 200;

// =============================================================================
// Data Source Trait
// =============================================================================

/// Everything the availability and quote flows read from the backend.
pub trait RentalDataSource: Send + Sync {
    /// Dates the backend lists as booked for `product_id` in `month`.
    fn booked_dates(
        &self,
        product_id: &str,
        month: YearMonth,
    ) -> impl Future<Output = ClientResult<Vec<NaiveDate>>> + Send;

    /// Rentals of `product_id` that touch `month`.
    fn rentals(
        &self,
        product_id: &str,
        month: YearMonth,
    ) -> impl Future<Output = ClientResult<Vec<RentalPeriod>>> + Send;

    /// Platform-wide delivery/return buffer settings.
    fn buffer_settings(&self) -> impl Future<Output = ClientResult<BufferSettings>> + Send;

    /// A single product with its price tiers and duration limits.
    fn product(&self, product_id: &str)
        -> impl Future<Output = ClientResult<RentalProduct>> + Send;
}

// =============================================================================
// Wire Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct BookedDatesResponse {
    #[serde(default)]
    booked_dates: Vec<String>,
}

/// `/settings/public` has shipped in three shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettingsResponse {
    Wrapped { buffer_settings: BufferSettings },
    Data { data: BufferSettings },
    Bare(BufferSettings),
}

impl SettingsResponse {
    fn into_settings(self) -> BufferSettings {
        match self {
            SettingsResponse::Wrapped { buffer_settings } => buffer_settings,
            SettingsResponse::Data { data } => data,
            SettingsResponse::Bare(settings) => settings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// `reqwest`-backed [`RentalDataSource`].
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpRentalApi {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HttpRentalApi {
    /// Builds a client from validated configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.api.timeout())
            .user_agent(concat!("lendly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Transport)?;

        Ok(HttpRentalApi {
            http,
            base_url,
            timeout_secs: config.api.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        self.handle_response(resp).await
    }

    fn transport(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> ClientResult<T> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await.map_err(|e| self.transport(e))?;
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ClientError {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|body| body.detail.or(body.message).or(body.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw)
                }
            });

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

impl RentalDataSource for HttpRentalApi {
    async fn booked_dates(&self, product_id: &str, month: YearMonth) -> ClientResult<Vec<NaiveDate>> {
        let month_key = month.to_string();
        let resp: BookedDatesResponse = self
            .get(&["products", product_id, "availability", &month_key])
            .await?;

        // A booked date we cannot read must not turn into a free one.
        resp.booked_dates
            .iter()
            .map(|raw| {
                parse_api_date(raw).ok_or_else(|| ClientError::Deserialization {
                    message: format!("invalid booked date {raw:?} for {month_key}"),
                    body: raw.clone(),
                })
            })
            .collect()
    }

    async fn rentals(&self, product_id: &str, month: YearMonth) -> ClientResult<Vec<RentalPeriod>> {
        let month_key = month.to_string();
        self.get(&["products", product_id, "rentals", &month_key]).await
    }

    async fn buffer_settings(&self) -> ClientResult<BufferSettings> {
        let resp: SettingsResponse = self.get(&["settings", "public"]).await?;
        Ok(resp.into_settings())
    }

    async fn product(&self, product_id: &str) -> ClientResult<RentalProduct> {
        self.get(&["products", product_id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpRentalApi {
        let mut config = ClientConfig::default();
        config.api.base_url = base.to_string();
        HttpRentalApi::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let month = YearMonth::new(2024, 3).unwrap().to_string();
        let url = api("https://api.example/api/")
            .endpoint(&["products", "42", "availability", &month])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example/api/products/42/availability/2024-03");

        let url = api("https://api.example/api").endpoint(&["settings", "public"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example/api/settings/public");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let url = api("https://api.example").endpoint(&["products", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example/products/a%2Fb%20c");
    }

    #[test]
    fn test_settings_shapes() {
        let shapes = [
            r#"{"enabled":true,"delivery_buffer_days":2,"return_buffer_days":1}"#,
            r#"{"buffer_settings":{"enabled":true,"delivery_buffer_days":2,"return_buffer_days":1}}"#,
            r#"{"data":{"enabled":true,"delivery_buffer_days":2,"return_buffer_days":1}}"#,
        ];
        for raw in shapes {
            let settings = serde_json::from_str::<SettingsResponse>(raw)
                .unwrap()
                .into_settings();
            assert_eq!(settings, BufferSettings::new(2, 1), "{raw}");
        }
    }

    #[test]
    fn test_preview_is_char_safe() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
