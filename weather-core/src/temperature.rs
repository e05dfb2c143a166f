use crate::model::{CurrentConditions, TemperatureLabel};

pub const COLD_BELOW: f64 = 5.0;
pub const HOT_ABOVE: f64 = 20.0;

/// Label for a "feels like" temperature in °C. Both thresholds are Moderate.
pub fn label_for(feels_like: f64) -> TemperatureLabel {
    if feels_like < COLD_BELOW {
        TemperatureLabel::Cold
    } else if feels_like > HOT_ABOVE {
        TemperatureLabel::Hot
    } else {
        TemperatureLabel::Moderate
    }
}

pub fn classify(conditions: &CurrentConditions) -> TemperatureLabel {
    label_for(conditions.main.feels_like)
}
