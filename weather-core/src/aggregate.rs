use tracing::{debug, warn};

use crate::{
    model::{AggregatedResponse, AlertSummary, Coordinates, WeatherReport},
    provider::WeatherSource,
    temperature::classify,
};

/// Fetch conditions and alerts concurrently and condense them into one
/// response.
///
/// Both calls always run to completion. A conditions failure turns the whole
/// response into `{"error": ...}`; an alerts failure only drops the `alerts`
/// field.
pub async fn aggregate(source: &dyn WeatherSource, coordinates: &Coordinates) -> AggregatedResponse {
    let (conditions, alerts) = tokio::join!(
        source.current_conditions(coordinates),
        source.alerts(coordinates),
    );

    let conditions = match conditions {
        Ok(conditions) => conditions,
        Err(err) => {
            warn!(
                endpoint = %err.endpoint(),
                latitude = %coordinates.latitude,
                longitude = %coordinates.longitude,
                error = ?err,
                "current conditions unavailable"
            );
            return AggregatedResponse::Error {
                error: err.to_string(),
            };
        }
    };

    let alerts = match alerts {
        Ok(Some(alerts)) => {
            for alert in &alerts {
                debug!(event = %alert.event, window = ?alert.active_window(), "active alert");
            }
            Some(alerts.into_iter().map(AlertSummary::from).collect())
        }
        Ok(None) => None,
        Err(err) => {
            warn!(endpoint = %err.endpoint(), error = ?err, "alerts dropped from response");
            None
        }
    };

    AggregatedResponse::Report(WeatherReport {
        temperature: classify(&conditions),
        conditions: conditions.weather.into_iter().map(|w| w.main).collect(),
        alerts,
    })
}
