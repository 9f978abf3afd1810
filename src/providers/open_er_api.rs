use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyCode;
use crate::core::rates::{ExchangeSnapshot, RateFetchError, RateProvider, RateTable};

/// Latest rates from the open ExchangeRate-API endpoint (`/v6/latest/{base}`).
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxglance/0.1")
            .timeout(timeout)
            .build()?;
        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    rates: Option<HashMap<String, f64>>,
}

fn usable_rates(rates: HashMap<String, f64>) -> RateTable {
    rates
        .into_iter()
        .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
        .map(|(code, rate)| (code.to_uppercase(), rate))
        .collect()
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(name = "OpenErApiFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<ExchangeSnapshot, RateFetchError> {
        let url = format!("{}/v6/latest/{}", self.base_url, base.code());
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RateFetchError::Network { base, source })?;

        if !response.status().is_success() {
            return Err(RateFetchError::Status {
                base,
                status: response.status(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| RateFetchError::Network { base, source })?;

        let data: LatestRatesResponse =
            serde_json::from_str(&text).map_err(|e| RateFetchError::Malformed {
                base,
                reason: e.to_string(),
            })?;

        if data.result.as_deref() == Some("error") {
            return Err(RateFetchError::Api {
                base,
                kind: data.error_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        let rates = data.rates.ok_or_else(|| RateFetchError::Malformed {
            base,
            reason: "missing field `rates`".to_string(),
        })?;

        let snapshot = ExchangeSnapshot {
            base,
            rates: usable_rates(rates),
            retrieved_at: Utc::now(),
            published_at: data
                .time_last_update_unix
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        };
        debug!(rates = snapshot.rates.len(), "Received rates");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v6/latest/{base}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(server: &MockServer) -> OpenErApiProvider {
        OpenErApiProvider::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_unix": 1760572951,
            "rates": {"USD": 1, "JOD": 0.709, "SAR": 3.75, "AED": 3.6725}
        }"#;
        let server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let snapshot = provider(&server)
            .fetch_rates(CurrencyCode::Usd)
            .await
            .unwrap();
        assert_eq!(snapshot.base, CurrencyCode::Usd);
        assert_eq!(snapshot.rates.len(), 4);
        assert_eq!(snapshot.rate_for(CurrencyCode::Jod), Some(0.709));
        assert_eq!(snapshot.rate_for(CurrencyCode::Aed), Some(3.6725));
        assert_eq!(
            snapshot.published_at.map(|t| t.timestamp()),
            Some(1760572951)
        );
    }

    #[tokio::test]
    async fn test_unusable_rates_are_dropped() {
        let mock_response = r#"{"rates": {"jod": 0.709, "SAR": 0, "AED": -1}}"#;
        let server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let snapshot = provider(&server)
            .fetch_rates(CurrencyCode::Usd)
            .await
            .unwrap();
        assert_eq!(snapshot.rates.len(), 1);
        assert_eq!(snapshot.rate_for(CurrencyCode::Jod), Some(0.709));
        assert!(snapshot.published_at.is_none());
    }

    #[tokio::test]
    async fn test_rates_api_error_response() {
        let server = create_mock_server("EUR", ResponseTemplate::new(500)).await;

        let result = provider(&server).fetch_rates(CurrencyCode::Eur).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for base EUR"
        );
    }

    #[tokio::test]
    async fn test_rates_malformed_response() {
        let server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
        )
        .await;

        let result = provider(&server).fetch_rates(CurrencyCode::Usd).await;
        assert!(matches!(result, Err(RateFetchError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_rates_missing_table() {
        let server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(r#"{"result": "success"}"#),
        )
        .await;

        let result = provider(&server).fetch_rates(CurrencyCode::Usd).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("missing field `rates`")
        );
    }

    #[tokio::test]
    async fn test_rates_service_reports_error() {
        let mock_response = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        let server = create_mock_server(
            "KWD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let result = provider(&server).fetch_rates(CurrencyCode::Kwd).await;
        match result {
            Err(RateFetchError::Api { base, kind }) => {
                assert_eq!(base, CurrencyCode::Kwd);
                assert_eq!(kind, "unsupported-code");
            }
            other => panic!("Expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // Nothing listens on the discard port.
        let provider = OpenErApiProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = provider.fetch_rates(CurrencyCode::Usd).await;
        assert!(matches!(result, Err(RateFetchError::Network { .. })));
    }
}
