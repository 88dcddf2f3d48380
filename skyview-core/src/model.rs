use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Unit system passed to the provider as the `units` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A resolved place. Every sub-fetch of one refresh uses these coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// What a refresh was triggered for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates(Coordinates),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::City(name) => f.write_str(name),
            Query::Coordinates(c) => write!(f, "{:.4},{:.4}", c.latitude, c.longitude),
        }
    }
}

/// Current conditions as reported by the provider, in the requested unit system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_direction_deg: Option<f64>,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub timezone_offset_secs: i32,
    pub coordinates: Coordinates,
    pub observation_time: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            name: self.location_name.clone(),
        }
    }
}

/// One slot of the 3-hour forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity_pct: u8,
    pub description: String,
}

/// Provider air-quality index, 1 (good) to 5 (very poor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQualityIndex(u8);

impl AirQualityIndex {
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            _ => "Very Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvIndex(pub f64);

impl UvIndex {
    /// WHO exposure category.
    pub fn category(&self) -> &'static str {
        match self.0 {
            v if v < 3.0 => "Low",
            v if v < 6.0 => "Moderate",
            v if v < 8.0 => "High",
            v if v < 11.0 => "Very High",
            _ => "Extreme",
        }
    }
}

/// Geocoding candidate for a partially typed city name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_system_parses_and_toggles() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::try_from("c").unwrap(), UnitSystem::Metric);
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled(), UnitSystem::Metric);
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn air_quality_index_rejects_out_of_range() {
        assert!(AirQualityIndex::new(0).is_none());
        assert!(AirQualityIndex::new(6).is_none());
        assert_eq!(AirQualityIndex::new(3).map(|a| a.label()), Some("Moderate"));
    }

    #[test]
    fn uv_categories() {
        assert_eq!(UvIndex(1.2).category(), "Low");
        assert_eq!(UvIndex(6.0).category(), "High");
        assert_eq!(UvIndex(11.5).category(), "Extreme");
    }

    #[test]
    fn suggestion_display_includes_country() {
        let s = Suggestion { name: "London".into(), country: "GB".into() };
        assert_eq!(s.to_string(), "London, GB");
    }
}
