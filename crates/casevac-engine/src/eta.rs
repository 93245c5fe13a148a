//! Travel-time model over great-circle distances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use casevac_core::GeoPoint;

use crate::rules::{AIR_SPEED_KMH, GROUND_SPEED_KMH};

/// Transport mode for ETA computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    Ground,
    Air,
}

impl TransportMode {
    pub fn speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Ground => GROUND_SPEED_KMH,
            TransportMode::Air => AIR_SPEED_KMH,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Ground => write!(f, "ground"),
            TransportMode::Air => write!(f, "air"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ground" => Ok(TransportMode::Ground),
            "air" => Ok(TransportMode::Air),
            _ => Err(format!("Unknown transport mode: {}", s)),
        }
    }
}

/// Estimated travel time in minutes between two points.
pub fn eta_minutes(from: &GeoPoint, to: &GeoPoint, mode: TransportMode) -> f64 {
    from.haversine_km(to) / mode.speed_kmh() * 60.0
}

/// Round minutes to one decimal for presentation. Internal arithmetic
/// always uses the unrounded value.
pub fn round_minutes(minutes: f64) -> f64 {
    (minutes * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_short_urban_hop() {
        let from = GeoPoint::new(43.6532, -79.3832);
        let to = GeoPoint::new(43.6591, -79.3877);
        let eta = eta_minutes(&from, &to, TransportMode::Ground);
        // ~0.75 km at 50 km/h
        assert!(eta > 0.7 && eta < 1.1, "eta was {}", eta);
    }

    #[test]
    fn test_air_is_four_times_faster() {
        let from = GeoPoint::new(0.0, 0.0);
        let to = GeoPoint::new(0.0, 1.0);
        let ground = eta_minutes(&from, &to, TransportMode::Ground);
        let air = eta_minutes(&from, &to, TransportMode::Air);
        assert!((ground / air - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_equator_tenth_degree() {
        // ~11.12 km at 50 km/h is ~13.3 minutes
        let from = GeoPoint::new(0.0, 0.0);
        let to = GeoPoint::new(0.0, 0.10);
        let eta = eta_minutes(&from, &to, TransportMode::Ground);
        assert!((eta - 13.34).abs() < 0.05, "eta was {}", eta);
    }

    #[test]
    fn test_round_minutes_one_decimal() {
        assert_eq!(round_minutes(13.3433), 13.3);
        assert_eq!(round_minutes(13.35), 13.4);
        assert_eq!(round_minutes(0.0), 0.0);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("GROUND".parse::<TransportMode>().unwrap(), TransportMode::Ground);
        assert_eq!("air".parse::<TransportMode>().unwrap(), TransportMode::Air);
        assert!("boat".parse::<TransportMode>().is_err());
    }
}
