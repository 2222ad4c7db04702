//! HTTP client for the sensor endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Connect and total timeout for a sensor fetch. Bounds worst-case poll
/// latency; the poll cadence is the caller's responsibility.
const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Bounds for deriving the endpoint's own alert flag when the payload omits
/// it. Display-only: the warning tier uses its own thresholds.
const DERIVED_ALERT_TEMP_C: f64 = 35.0;
const DERIVED_ALERT_HUMIDITY_PCT: f64 = 90.0;

/// One sample from the sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    /// Alert flag as reported (or derived) at the endpoint. Informational
    /// only; it never feeds tier classification.
    pub alert: bool,
    pub observed_at: DateTime<Utc>,
}

/// Wire format of `GET /sensor`.
#[derive(Debug, Deserialize)]
struct SensorPayload {
    temperature: f64,
    humidity: f64,
    alert: Option<bool>,
}

impl SensorPayload {
    fn into_reading(self, observed_at: DateTime<Utc>) -> SensorReading {
        let alert = self.alert.unwrap_or(
            self.temperature > DERIVED_ALERT_TEMP_C || self.humidity > DERIVED_ALERT_HUMIDITY_PCT,
        );
        SensorReading {
            temperature: self.temperature,
            humidity: self.humidity,
            alert,
            observed_at,
        }
    }
}

/// Fetch error types. All are recovered locally; the monitor keeps polling.
#[derive(Debug)]
pub enum FetchError {
    /// Connection failure or timeout
    Network(String),
    /// Non-success HTTP status
    Status(u16),
    /// Body was not the expected JSON shape
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Status(status) => write!(f, "sensor returned status {status}"),
            FetchError::Malformed(msg) => write!(f, "malformed sensor response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Client for a single sensor endpoint.
pub struct SensorClient {
    client: reqwest::Client,
    base_url: String,
}

impl SensorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(FETCH_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// URL of the sample endpoint.
    pub fn sensor_url(&self) -> String {
        format!("{}/sensor", self.base_url)
    }

    /// Fetch a single reading. No internal retry; a failed poll surfaces as
    /// one `FetchError` and the next poll starts clean.
    pub async fn fetch(&self) -> Result<SensorReading, FetchError> {
        let response = self
            .client
            .get(self.sensor_url())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: SensorPayload = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        Ok(payload.into_reading(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_sensor_url() {
        let client = SensorClient::new("http://192.168.4.1");
        assert_eq!(client.sensor_url(), "http://192.168.4.1/sensor");

        let client = SensorClient::new("http://192.168.4.1/");
        assert_eq!(client.sensor_url(), "http://192.168.4.1/sensor");
    }

    #[test]
    fn test_alert_flag_passed_through() {
        let payload = SensorPayload {
            temperature: 5.0,
            humidity: 50.0,
            alert: Some(true),
        };
        assert!(payload.into_reading(Utc::now()).alert);
    }

    #[test]
    fn test_alert_flag_derived_when_absent() {
        let cool = SensorPayload {
            temperature: 20.0,
            humidity: 50.0,
            alert: None,
        };
        assert!(!cool.into_reading(Utc::now()).alert);

        let hot = SensorPayload {
            temperature: 36.0,
            humidity: 50.0,
            alert: None,
        };
        assert!(hot.into_reading(Utc::now()).alert);

        let humid = SensorPayload {
            temperature: 20.0,
            humidity: 95.0,
            alert: None,
        };
        assert!(humid.into_reading(Utc::now()).alert);
    }

    /// Serve one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_parses_reading() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"temperature": 7.5, "humidity": 61.2}"#,
        )
        .await;

        let reading = SensorClient::new(url).fetch().await.unwrap();
        assert_eq!(reading.temperature, 7.5);
        assert_eq!(reading.humidity, 61.2);
        assert!(!reading.alert);
    }

    #[tokio::test]
    async fn test_fetch_rejects_missing_field() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"temperature": 7.5}"#).await;

        match SensorClient::new(url).fetch().await {
            Err(FetchError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", "{}").await;

        match SensorClient::new(url).fetch().await {
            Err(FetchError::Status(500)) => {}
            other => panic!("expected Status(500), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_connection_failure() {
        // Bind then immediately drop a listener so the port is closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        match SensorClient::new(format!("http://{addr}")).fetch().await {
            Err(FetchError::Network(_)) => {}
            other => panic!("expected Network, got {other:?}"),
        }
    }
}
