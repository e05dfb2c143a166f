use crate::{
    error::FetchError,
    model::{AlertEntry, Coordinates, CurrentConditions},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Upstream source of current conditions and active alerts.
///
/// Each call is independent: a failure of one must not influence the other.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current_conditions(
        &self,
        coordinates: &Coordinates,
    ) -> Result<CurrentConditions, FetchError>;

    /// `Ok(None)` means the provider reported no alerts at all.
    async fn alerts(
        &self,
        coordinates: &Coordinates,
    ) -> Result<Option<Vec<AlertEntry>>, FetchError>;
}
