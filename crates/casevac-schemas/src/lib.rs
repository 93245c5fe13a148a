//! Wire-level schema types for triage pipeline output
//!
//! The upstream triage pipeline emits permissive JSON: optional fields,
//! legacy acuity tags, free-form extra keys. This crate models those wire
//! shapes as serde DTOs ([`PatientRecord`], [`FacilityRecord`]) and
//! converts them into the strict `casevac-core` model.
//!
//! Conversion is where validation happens: malformed numbers and impossible
//! enums must be rejected here, before anything reaches the decision
//! engine. The engine assumes a well-formed [`Patient`] and [`Facility`].
//!
//! Unknown top-level fields are ignored. Unknown capability/resource keys
//! inside the requirement maps are dropped with a warning, because the
//! alphabets are closed.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use casevac_core::{
    Acuity, Capability, CasevacError, CasevacResult, Facility, GeoPoint, Patient, Resource,
};

/// A `{lat, lon}` pair as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub lat: f64,
    pub lon: f64,
}

impl From<LocationRecord> for GeoPoint {
    fn from(loc: LocationRecord) -> Self {
        GeoPoint::new(loc.lat, loc.lon)
    }
}

/// Patient record as produced by the triage pipeline.
///
/// Only the fields the decision engine consumes are modeled; everything
/// else in the upstream JSON is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    #[serde(default)]
    pub acuity: Option<String>,
    #[serde(default)]
    pub location: Option<LocationRecord>,
    /// POSIX seconds
    #[serde(default)]
    pub predicted_death_timestamp: Option<f64>,
    #[serde(default)]
    pub required_medical_capabilities: BTreeMap<String, bool>,
    #[serde(default)]
    pub required_medical_resources: BTreeMap<String, u32>,
    #[serde(default)]
    pub deceased: bool,
}

/// Facility record as provided by the facility registry.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityRecord {
    pub facility_id: String,
    #[serde(default)]
    pub facility_name: Option<String>,
    /// 1 = definitive care, 2 = surgical, 3 = forward
    pub level: u8,
    pub location: LocationRecord,
    #[serde(default)]
    pub capabilities: BTreeMap<String, bool>,
    #[serde(default)]
    pub medical_resources: BTreeMap<String, u32>,
}

/// Map a wire acuity tag to the SALT alphabet.
///
/// Accepts both the SALT names and the legacy tags {Critical, Severe,
/// Minor, Deceased, Undefined}, case-insensitively. Unknown tags and an
/// absent tag both map to Delayed, the neutral mid-weight class.
pub fn parse_acuity(tag: Option<&str>) -> Acuity {
    let Some(tag) = tag else {
        return Acuity::Delayed;
    };
    match tag.to_lowercase().as_str() {
        "dead" | "deceased" => Acuity::Dead,
        "expectant" => Acuity::Expectant,
        "immediate" | "critical" => Acuity::Immediate,
        "delayed" | "severe" | "undefined" => Acuity::Delayed,
        "minimal" | "minor" => Acuity::Minimal,
        other => {
            warn!(tag = other, "unknown acuity tag, defaulting to Delayed");
            Acuity::Delayed
        }
    }
}

fn convert_capability_map(
    entity: &str,
    raw: &BTreeMap<String, bool>,
) -> BTreeMap<Capability, bool> {
    let mut out = BTreeMap::new();
    for (key, &flag) in raw {
        match key.parse::<Capability>() {
            Ok(cap) => {
                out.insert(cap, flag);
            }
            Err(_) => warn!(entity, key = key.as_str(), "dropping unknown capability key"),
        }
    }
    out
}

fn convert_resource_map(entity: &str, raw: &BTreeMap<String, u32>) -> BTreeMap<Resource, u32> {
    let mut out = BTreeMap::new();
    for (key, &count) in raw {
        match key.parse::<Resource>() {
            Ok(res) => {
                out.insert(res, count);
            }
            Err(_) => warn!(entity, key = key.as_str(), "dropping unknown resource key"),
        }
    }
    out
}

fn validate_location(entity: &str, loc: &LocationRecord) -> CasevacResult<GeoPoint> {
    let point = GeoPoint::new(loc.lat, loc.lon);
    if !point.is_valid() {
        return Err(CasevacError::Validation(format!(
            "{}: coordinates ({}, {}) are not valid WGS-84 degrees",
            entity, loc.lat, loc.lon
        )));
    }
    Ok(point)
}

impl TryFrom<PatientRecord> for Patient {
    type Error = CasevacError;

    fn try_from(record: PatientRecord) -> CasevacResult<Self> {
        if record.patient_id.trim().is_empty() {
            return Err(CasevacError::Validation("patient_id is empty".into()));
        }
        let entity = format!("patient {}", record.patient_id);

        let location = record
            .location
            .as_ref()
            .map(|loc| validate_location(&entity, loc))
            .transpose()?;

        if let Some(ts) = record.predicted_death_timestamp {
            if !ts.is_finite() {
                return Err(CasevacError::Validation(format!(
                    "{}: predicted_death_timestamp is not finite",
                    entity
                )));
            }
        }

        let mut patient = Patient::new(record.patient_id.clone(), parse_acuity(record.acuity.as_deref()));
        patient.location = location;
        patient.predicted_death_epoch_secs = record.predicted_death_timestamp;
        patient.required_capabilities =
            convert_capability_map(&entity, &record.required_medical_capabilities);
        patient.required_resources =
            convert_resource_map(&entity, &record.required_medical_resources);
        patient.deceased = record.deceased;
        Ok(patient)
    }
}

impl TryFrom<FacilityRecord> for Facility {
    type Error = CasevacError;

    fn try_from(record: FacilityRecord) -> CasevacResult<Self> {
        if record.facility_id.trim().is_empty() {
            return Err(CasevacError::Validation("facility_id is empty".into()));
        }
        let entity = format!("facility {}", record.facility_id);

        if !(1..=3).contains(&record.level) {
            return Err(CasevacError::Validation(format!(
                "{}: level {} is outside 1..=3",
                entity, record.level
            )));
        }
        let location = validate_location(&entity, &record.location)?;

        let name = record
            .facility_name
            .clone()
            .unwrap_or_else(|| record.facility_id.clone());

        let mut facility = Facility::new(record.facility_id.clone(), name, record.level, location);
        facility.capabilities = convert_capability_map(&entity, &record.capabilities);
        facility.resources = convert_resource_map(&entity, &record.medical_resources);
        Ok(facility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient_json() -> serde_json::Value {
        json!({
            "patient_id": "P-100",
            "acuity": "Critical",
            "location": {"lat": 43.6532, "lon": -79.3832},
            "predicted_death_timestamp": 1_700_003_600.0,
            "required_medical_capabilities": {
                "trauma_center": true,
                "telemetry": true
            },
            "required_medical_resources": {
                "operating_room": 1,
                "hyperbaric_chamber": 2
            },
            "deceased": false,
            "narrative": "extracted by the triage pipeline, ignored here"
        })
    }

    #[test]
    fn test_patient_record_conversion() {
        let record: PatientRecord = serde_json::from_value(patient_json()).unwrap();
        let patient: Patient = record.try_into().unwrap();

        // Legacy tag mapped onto SALT
        assert_eq!(patient.acuity, Acuity::Immediate);
        assert!(patient.requires(Capability::TraumaCenter));
        // Unknown keys were dropped, not errored
        assert_eq!(patient.required_capabilities.len(), 1);
        assert_eq!(patient.required_count(Resource::OperatingRoom), 1);
        assert_eq!(patient.required_resources.len(), 1);
        assert_eq!(patient.predicted_death_epoch_secs, Some(1_700_003_600.0));
    }

    #[test]
    fn test_legacy_acuity_mapping() {
        assert_eq!(parse_acuity(Some("Critical")), Acuity::Immediate);
        assert_eq!(parse_acuity(Some("Severe")), Acuity::Delayed);
        assert_eq!(parse_acuity(Some("Minor")), Acuity::Minimal);
        assert_eq!(parse_acuity(Some("Deceased")), Acuity::Dead);
        assert_eq!(parse_acuity(Some("Undefined")), Acuity::Delayed);
        assert_eq!(parse_acuity(Some("immediate")), Acuity::Immediate);
        assert_eq!(parse_acuity(Some("something else")), Acuity::Delayed);
        assert_eq!(parse_acuity(None), Acuity::Delayed);
    }

    #[test]
    fn test_patient_without_location_is_allowed() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient_id": "P-101",
            "acuity": "Minimal"
        }))
        .unwrap();
        let patient: Patient = record.try_into().unwrap();
        assert!(patient.location.is_none());
        assert!(patient.predicted_death_epoch_secs.is_none());
    }

    #[test]
    fn test_patient_bad_coordinates_rejected() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient_id": "P-102",
            "location": {"lat": 95.0, "lon": 10.0}
        }))
        .unwrap();
        let err = Patient::try_from(record).unwrap_err();
        assert!(matches!(err, CasevacError::Validation(_)));
    }

    #[test]
    fn test_patient_empty_id_rejected() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient_id": "  "
        }))
        .unwrap();
        assert!(Patient::try_from(record).is_err());
    }

    #[test]
    fn test_negative_resource_count_fails_deserialization() {
        let result: Result<PatientRecord, _> = serde_json::from_value(json!({
            "patient_id": "P-103",
            "required_medical_resources": {"ward": -2}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_facility_record_conversion() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "facility_id": "F-7",
            "facility_name": "Mercy Trauma Centre",
            "level": 1,
            "location": {"lat": 43.66, "lon": -79.39},
            "capabilities": {"trauma_center": true, "burn": true},
            "medical_resources": {"ordinary_icu": 6, "ventilator": 12}
        }))
        .unwrap();
        let facility: Facility = record.try_into().unwrap();

        assert_eq!(facility.name, "Mercy Trauma Centre");
        assert!(facility.has_capability(Capability::Burn));
        assert_eq!(facility.capacity(Resource::Ventilator), 12);
    }

    #[test]
    fn test_facility_name_defaults_to_id() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "facility_id": "F-8",
            "level": 2,
            "location": {"lat": 0.0, "lon": 0.0}
        }))
        .unwrap();
        let facility: Facility = record.try_into().unwrap();
        assert_eq!(facility.name, "F-8");
    }

    #[test]
    fn test_facility_invalid_level_rejected() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "facility_id": "F-9",
            "level": 4,
            "location": {"lat": 0.0, "lon": 0.0}
        }))
        .unwrap();
        let err = Facility::try_from(record).unwrap_err();
        assert!(err.to_string().contains("level"));
    }
}
