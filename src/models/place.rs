use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Identity of a stored place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub Uuid);

impl FromStr for PlaceId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Uuid::parse_str(s.trim())
            .map(PlaceId)
            .map_err(|e| AppError::InvalidInput(format!("Malformed place id '{}': {}", s, e)))
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A place selected by a user, with validated coordinates in decimal degrees
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: PlaceId,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    /// Builds a place from coordinates persisted as text
    pub fn from_stored(id: PlaceId, lat: &str, lon: &str) -> AppResult<Self> {
        let latitude = parse_coordinate(lat, "latitude", 90.0)?;
        let longitude = parse_coordinate(lon, "longitude", 180.0)?;
        Ok(Self {
            id,
            latitude,
            longitude,
        })
    }
}

fn parse_coordinate(raw: &str, axis: &str, bound: f64) -> AppResult<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid {}: '{}'", axis, raw)))?;

    if !value.is_finite() || value.abs() > bound {
        return Err(AppError::InvalidInput(format!(
            "{} {} out of range",
            axis, value
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_id_parses_uuid() {
        let id: PlaceId = "6f1c2b9e-8a43-4d3e-9a57-0c1b2d3e4f50".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c2b9e-8a43-4d3e-9a57-0c1b2d3e4f50");
    }

    #[test]
    fn test_place_id_rejects_garbage() {
        let result = "not-a-place".parse::<PlaceId>();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_place_from_stored_text() {
        let id = PlaceId(Uuid::new_v4());
        let place = Place::from_stored(id, "48.8566", " 2.3522 ").unwrap();
        assert_eq!(place.latitude, 48.8566);
        assert_eq!(place.longitude, 2.3522);
    }

    #[test]
    fn test_place_rejects_unparseable_coordinates() {
        let id = PlaceId(Uuid::new_v4());
        assert!(Place::from_stored(id, "north", "2.35").is_err());
        assert!(Place::from_stored(id, "48.85", "").is_err());
    }

    #[test]
    fn test_place_rejects_out_of_range_coordinates() {
        let id = PlaceId(Uuid::new_v4());
        assert!(Place::from_stored(id, "91.0", "0").is_err());
        assert!(Place::from_stored(id, "0", "-180.5").is_err());
        assert!(Place::from_stored(id, "NaN", "0").is_err());
    }
}
