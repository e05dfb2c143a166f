use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::Config,
    error::{Endpoint, FetchError},
    model::{AlertEntry, Coordinates, CurrentConditions},
};

use super::WeatherSource;

/// Categories dropped from the one-call response. `alerts` is listed as well,
/// which matches the deployed behaviour; removing it changes what upstream
/// returns.
pub const ALERTS_EXCLUDE: &str = "minutely,hourly,daily,current,alerts";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http,
        }
    }

    /// Build a provider with its own pooled client, honouring the configured
    /// request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_owned();

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self::new(api_key, config.base_url.clone(), http))
    }

    async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                endpoint,
                code: status.as_u16(),
            });
        }

        let body = res
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        Ok(body.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct OwAlertsResponse {
    #[serde(default)]
    alerts: Option<Vec<AlertEntry>>,
}

/// Decode a current-weather body. Any missing field or wrong primitive type is
/// a shape error.
pub fn parse_conditions(body: &[u8]) -> Result<CurrentConditions, FetchError> {
    serde_json::from_slice(body).map_err(|source| FetchError::Shape {
        endpoint: Endpoint::Conditions,
        source,
    })
}

/// Decode a one-call body. An absent or null `alerts` field is "no alerts";
/// a single malformed alert rejects the whole body.
pub fn parse_alerts(body: &[u8]) -> Result<Option<Vec<AlertEntry>>, FetchError> {
    serde_json::from_slice::<OwAlertsResponse>(body)
        .map(|parsed| parsed.alerts)
        .map_err(|source| FetchError::Shape {
            endpoint: Endpoint::Alerts,
            source,
        })
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    async fn current_conditions(
        &self,
        coordinates: &Coordinates,
    ) -> Result<CurrentConditions, FetchError> {
        let body = self
            .get(
                Endpoint::Conditions,
                "weather",
                &[
                    ("lat", coordinates.latitude.as_str()),
                    ("lon", coordinates.longitude.as_str()),
                    ("units", "metric"),
                ],
            )
            .await?;

        parse_conditions(&body)
    }

    async fn alerts(
        &self,
        coordinates: &Coordinates,
    ) -> Result<Option<Vec<AlertEntry>>, FetchError> {
        let body = self
            .get(
                Endpoint::Alerts,
                "onecall",
                &[
                    ("lat", coordinates.latitude.as_str()),
                    ("lon", coordinates.longitude.as_str()),
                    ("exclude", ALERTS_EXCLUDE),
                ],
            )
            .await?;

        parse_alerts(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn valid_conditions() -> Value {
        json!({
            "coord": { "lon": -0.13, "lat": 51.51 },
            "weather": [
                { "id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d" }
            ],
            "main": {
                "temp": 11.2,
                "feels_like": 10,
                "temp_min": 9.4,
                "temp_max": 12.8,
                "pressure": 1012,
                "humidity": 81
            },
            "name": "London"
        })
    }

    fn flood_warning() -> Value {
        json!({
            "sender_name": "NWS",
            "event": "Flood Warning",
            "start": 1000,
            "end": 2000,
            "description": "River expected to crest tonight.",
            "tags": ["Flood"]
        })
    }

    fn bytes(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn conditions_accepts_valid_body() {
        let parsed = parse_conditions(&bytes(&valid_conditions())).unwrap();

        assert_eq!(parsed.weather.len(), 1);
        assert_eq!(parsed.weather[0].main, "Clouds");
        assert_eq!(parsed.main.feels_like, 10.0);
    }

    #[test]
    fn conditions_accepts_empty_weather_list() {
        let mut body = valid_conditions();
        body["weather"] = json!([]);

        let parsed = parse_conditions(&bytes(&body)).unwrap();
        assert!(parsed.weather.is_empty());
    }

    #[test]
    fn conditions_rejects_missing_metric() {
        for field in ["feels_like", "temp_min", "temp_max", "pressure", "humidity"] {
            let mut body = valid_conditions();
            body["main"].as_object_mut().unwrap().remove(field);

            let err = parse_conditions(&bytes(&body)).unwrap_err();
            assert!(
                matches!(err, FetchError::Shape { endpoint: Endpoint::Conditions, .. }),
                "missing {field} should be a shape error"
            );
        }
    }

    #[test]
    fn conditions_rejects_non_numeric_metric() {
        let mut body = valid_conditions();
        body["main"]["humidity"] = json!("81%");

        assert!(parse_conditions(&bytes(&body)).is_err());
    }

    #[test]
    fn conditions_rejects_non_string_icon() {
        let mut body = valid_conditions();
        body["weather"][0]["icon"] = json!(2);

        let err = parse_conditions(&bytes(&body)).unwrap_err();
        assert_eq!(err.to_string(), "Error parsing Weather JSON response object");
    }

    #[test]
    fn conditions_rejects_missing_weather_list() {
        let mut body = valid_conditions();
        body.as_object_mut().unwrap().remove("weather");

        assert!(parse_conditions(&bytes(&body)).is_err());
    }

    #[test]
    fn conditions_rejects_null_body() {
        assert!(parse_conditions(b"null").is_err());
    }

    #[test]
    fn alerts_absent_means_no_alerts() {
        let body = json!({ "lat": 33.44, "lon": -94.04, "timezone": "America/Chicago" });
        assert_eq!(parse_alerts(&bytes(&body)).unwrap(), None);
    }

    #[test]
    fn alerts_null_means_no_alerts() {
        let body = json!({ "alerts": null });
        assert_eq!(parse_alerts(&bytes(&body)).unwrap(), None);
    }

    #[test]
    fn alerts_accepts_valid_list() {
        let body = json!({ "alerts": [flood_warning()] });

        let alerts = parse_alerts(&bytes(&body)).unwrap().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sender_name, "NWS");
        assert_eq!(alerts[0].start, 1000.0);
    }

    #[test]
    fn alerts_accepts_fractional_and_exponent_timestamps() {
        let mut alert = flood_warning();
        alert["start"] = json!(1000.0);
        alert["end"] = json!(1.7e9);
        let body = json!({ "alerts": [alert] });

        let alerts = parse_alerts(&bytes(&body)).unwrap().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].start, 1000.0);
        assert_eq!(alerts[0].end, 1_700_000_000.0);
    }

    #[test]
    fn alerts_rejects_string_timestamp() {
        let mut alert = flood_warning();
        alert["start"] = json!("1000");
        let body = json!({ "alerts": [alert] });

        assert!(parse_alerts(&bytes(&body)).is_err());
    }

    #[test]
    fn alerts_rejects_element_without_sender() {
        let mut broken = flood_warning();
        broken.as_object_mut().unwrap().remove("sender_name");
        let body = json!({ "alerts": [flood_warning(), broken] });

        let err = parse_alerts(&bytes(&body)).unwrap_err();
        assert!(matches!(err, FetchError::Shape { endpoint: Endpoint::Alerts, .. }));
    }

    #[test]
    fn alerts_rejects_null_element() {
        let body = json!({ "alerts": [null] });
        assert!(parse_alerts(&bytes(&body)).is_err());
    }

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("TEST_KEY".into(), server.base_url(), Client::new())
    }

    #[tokio::test]
    async fn fetches_conditions_with_metric_units() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/weather")
                    .query_param("lat", "51.51")
                    .query_param("lon", "-0.13")
                    .query_param("units", "metric")
                    .query_param("appid", "TEST_KEY");
                then.status(200).json_body(valid_conditions());
            })
            .await;

        let coords = Coordinates::new("51.51", "-0.13");
        let conditions = provider(&server).current_conditions(&coords).await.unwrap();

        mock.assert_async().await;
        assert_eq!(conditions.weather[0].description, "few clouds");
    }

    #[tokio::test]
    async fn non_200_conditions_is_a_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/weather");
                then.status(500);
            })
            .await;

        let coords = Coordinates::new("1", "2");
        let err = provider(&server).current_conditions(&coords).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { code: 500, .. }));
        assert_eq!(err.to_string(), "Could not fetch weather - 500");
    }

    #[tokio::test]
    async fn other_2xx_is_still_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/onecall");
                then.status(204);
            })
            .await;

        let coords = Coordinates::new("1", "2");
        let err = provider(&server).alerts(&coords).await.unwrap_err();

        assert_eq!(err.to_string(), "Could not fetch Weather alerts - 204");
    }

    #[tokio::test]
    async fn fetches_alerts_with_exclude_list() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/onecall")
                    .query_param("lat", "33.44")
                    .query_param("lon", "-94.04")
                    .query_param("exclude", ALERTS_EXCLUDE)
                    .query_param("appid", "TEST_KEY");
                then.status(200).json_body(json!({ "alerts": [flood_warning()] }));
            })
            .await;

        let coords = Coordinates::new("33.44", "-94.04");
        let alerts = provider(&server).alerts(&coords).await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(alerts[0].event, "Flood Warning");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_error() {
        // Port 9 (discard) is closed on loopback.
        let provider =
            OpenWeatherProvider::new("KEY".into(), "http://127.0.0.1:9", Client::new());

        let err = provider
            .current_conditions(&Coordinates::new("1", "2"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { endpoint: Endpoint::Conditions, .. }));
        assert!(err.to_string().starts_with("Could not fetch weather - "));
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = OpenWeatherProvider::from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            OpenWeatherProvider::new("KEY".into(), "http://localhost:1/data/2.5/", Client::new());
        assert_eq!(provider.base_url, "http://localhost:1/data/2.5");
    }
}
