//! Core library for the weather aggregation service.
//!
//! This crate defines:
//! - Configuration loading (file + environment)
//! - The OpenWeather upstream and its response shape validation
//! - Temperature classification
//! - Concurrent aggregation of conditions and alerts into one response
//!
//! It is used by `weather-server`, but has no HTTP server of its own.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod temperature;

pub use aggregate::aggregate;
pub use config::Config;
pub use error::{Endpoint, FetchError};
pub use model::{
    AggregatedResponse, AlertEntry, AlertSummary, Coordinates, CurrentConditions,
    TemperatureLabel, WeatherReport,
};
pub use provider::{OpenWeatherProvider, WeatherSource};
pub use temperature::classify;
