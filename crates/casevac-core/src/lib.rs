//! # casevac-core: Casualty Transfer Data Model
//!
//! Provides the fundamental data structures consumed by the transfer
//! decision engine: triaged patients, candidate facilities, the closed
//! capability/resource alphabets, and geodesy primitives.
//!
//! ## Design Philosophy
//!
//! The upstream triage pipeline is permissive and stringly typed; this
//! crate is neither. Everything that the decision engine branches on is a
//! closed enum:
//!
//! - [`Acuity`]: the SALT triage alphabet (legacy tags are mapped at the
//!   wire layer, see `casevac-schemas`)
//! - [`Capability`] / [`Resource`]: the fixed capability and resource keys
//! - [`IncidentType`]: dispatch mode (MCI / PHE / MEDEVAC)
//! - [`EchelonRole`]: NATO echelons of care, mapped to facility levels
//!
//! Map-typed fields use `BTreeMap` so that iteration order, and therefore
//! serialized output, is deterministic.
//!
//! ## Quick Start
//!
//! ```rust
//! use casevac_core::*;
//!
//! let patient = Patient::new("P-001", Acuity::Immediate)
//!     .at(GeoPoint::new(43.6532, -79.3832))
//!     .require_capability(Capability::TraumaCenter)
//!     .require_resource(Resource::OperatingRoom, 1);
//!
//! let facility = Facility::new("F-001", "General Hospital", 1, GeoPoint::new(43.6591, -79.3877))
//!     .with_capability(Capability::TraumaCenter)
//!     .with_resource(Resource::OperatingRoom, 4);
//!
//! assert!(facility.has_capability(Capability::TraumaCenter));
//! assert!(patient.requires(Capability::TraumaCenter));
//! ```
//!
//! ## ID System
//!
//! Patients and facilities carry opaque string identifiers wrapped in
//! newtypes ([`PatientId`], [`FacilityId`]) so the two can never be
//! confused. Both are totally ordered; the engine's deterministic
//! tie-breaking leans on that ordering.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{CasevacError, CasevacResult};

/// Mean Earth radius in kilometers, used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(String);

impl PatientId {
    pub fn new(value: impl Into<String>) -> Self {
        PatientId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FacilityId {
    pub fn new(value: impl Into<String>) -> Self {
        FacilityId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point on the WGS-84 ellipsoid, in decimal degrees.
///
/// Distances are computed on a spherical Earth of radius
/// [`EARTH_RADIUS_KM`]; the error versus the ellipsoid is well under the
/// uncertainty of any ground-transport speed assumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, positive north
    pub lat_deg: f64,
    /// Longitude in decimal degrees, positive east
    pub lon_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Great-circle distance to `other` in kilometers (haversine formula).
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat_deg.to_radians();
        let lat2 = other.lat_deg.to_radians();
        let dlat = (other.lat_deg - self.lat_deg).to_radians();
        let dlon = (other.lon_deg - self.lon_deg).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }

    /// True when both coordinates are finite and within WGS-84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && self.lat_deg.abs() <= 90.0
            && self.lon_deg.abs() <= 180.0
    }
}

/// SALT triage acuity.
///
/// The legacy tags {Critical, Severe, Minor, Deceased, Undefined} are
/// mapped to this alphabet at the wire layer; the engine only ever sees
/// these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Acuity {
    Dead,
    Expectant,
    Immediate,
    Delayed,
    Minimal,
}

impl fmt::Display for Acuity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acuity::Dead => write!(f, "Dead"),
            Acuity::Expectant => write!(f, "Expectant"),
            Acuity::Immediate => write!(f, "Immediate"),
            Acuity::Delayed => write!(f, "Delayed"),
            Acuity::Minimal => write!(f, "Minimal"),
        }
    }
}

/// Medical capability keys (closed set).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TraumaCenter,
    Neurosurgical,
    Orthopedic,
    Ophthalmology,
    Burn,
    Pediatric,
    Obstetric,
    Cardiac,
    Thoracic,
    Vascular,
    Ent,
    Hepatobiliary,
}

impl Capability {
    /// All capability keys, in declaration order.
    pub const ALL: [Capability; 12] = [
        Capability::TraumaCenter,
        Capability::Neurosurgical,
        Capability::Orthopedic,
        Capability::Ophthalmology,
        Capability::Burn,
        Capability::Pediatric,
        Capability::Obstetric,
        Capability::Cardiac,
        Capability::Thoracic,
        Capability::Vascular,
        Capability::Ent,
        Capability::Hepatobiliary,
    ];

    /// Wire name (snake_case), e.g. `trauma_center`.
    pub fn key(&self) -> &'static str {
        match self {
            Capability::TraumaCenter => "trauma_center",
            Capability::Neurosurgical => "neurosurgical",
            Capability::Orthopedic => "orthopedic",
            Capability::Ophthalmology => "ophthalmology",
            Capability::Burn => "burn",
            Capability::Pediatric => "pediatric",
            Capability::Obstetric => "obstetric",
            Capability::Cardiac => "cardiac",
            Capability::Thoracic => "thoracic",
            Capability::Vascular => "vascular",
            Capability::Ent => "ent",
            Capability::Hepatobiliary => "hepatobiliary",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("Unknown capability key: {}", s))
    }
}

/// Medical resource keys (closed set).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Ward,
    OrdinaryIcu,
    OperatingRoom,
    Ventilator,
    PrbcUnit,
    Isolation,
    DecontaminationUnit,
    CtScanner,
    OxygenCylinder,
    InterventionalRadiology,
}

impl Resource {
    /// All resource keys, in declaration order.
    pub const ALL: [Resource; 10] = [
        Resource::Ward,
        Resource::OrdinaryIcu,
        Resource::OperatingRoom,
        Resource::Ventilator,
        Resource::PrbcUnit,
        Resource::Isolation,
        Resource::DecontaminationUnit,
        Resource::CtScanner,
        Resource::OxygenCylinder,
        Resource::InterventionalRadiology,
    ];

    /// Wire name (snake_case), e.g. `operating_room`.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::Ward => "ward",
            Resource::OrdinaryIcu => "ordinary_icu",
            Resource::OperatingRoom => "operating_room",
            Resource::Ventilator => "ventilator",
            Resource::PrbcUnit => "prbc_unit",
            Resource::Isolation => "isolation",
            Resource::DecontaminationUnit => "decontamination_unit",
            Resource::CtScanner => "ct_scanner",
            Resource::OxygenCylinder => "oxygen_cylinder",
            Resource::InterventionalRadiology => "interventional_radiology",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.key() == s)
            .ok_or_else(|| format!("Unknown resource key: {}", s))
    }
}

/// Incident dispatch mode.
///
/// MCI and PHE use single-destination optimization; MEDEVAC constructs a
/// Role 1 → 2 → 3 evacuation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentType {
    Mci,
    Phe,
    Medevac,
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentType::Mci => write!(f, "MCI"),
            IncidentType::Phe => write!(f, "PHE"),
            IncidentType::Medevac => write!(f, "MEDEVAC"),
        }
    }
}

impl FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MCI" => Ok(IncidentType::Mci),
            "PHE" => Ok(IncidentType::Phe),
            "MEDEVAC" => Ok(IncidentType::Medevac),
            _ => Err(format!("Unknown incident type: {}", s)),
        }
    }
}

/// NATO echelon of care.
///
/// Facility levels map inversely: level 3 is forward (Role 1), level 2 is
/// surgical (Role 2), level 1 is definitive care (Role 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EchelonRole {
    #[serde(rename = "Role 1")]
    Role1,
    #[serde(rename = "Role 2")]
    Role2,
    #[serde(rename = "Role 3")]
    Role3,
}

impl EchelonRole {
    /// Roles in evacuation order: forward care first, definitive care last.
    pub const IN_EVACUATION_ORDER: [EchelonRole; 3] =
        [EchelonRole::Role1, EchelonRole::Role2, EchelonRole::Role3];

    /// Facility level providing this role.
    pub fn facility_level(&self) -> u8 {
        match self {
            EchelonRole::Role1 => 3,
            EchelonRole::Role2 => 2,
            EchelonRole::Role3 => 1,
        }
    }

    /// Role provided by a facility level, if the level is valid.
    pub fn from_facility_level(level: u8) -> Option<EchelonRole> {
        match level {
            3 => Some(EchelonRole::Role1),
            2 => Some(EchelonRole::Role2),
            1 => Some(EchelonRole::Role3),
            _ => None,
        }
    }
}

impl fmt::Display for EchelonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchelonRole::Role1 => write!(f, "Role 1"),
            EchelonRole::Role2 => write!(f, "Role 2"),
            EchelonRole::Role3 => write!(f, "Role 3"),
        }
    }
}

/// A triaged patient, as consumed by the decision engine.
///
/// Inputs are immutable for the duration of one decision; the engine never
/// mutates a patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub acuity: Acuity,
    /// Last known position; `None` makes the patient unroutable.
    pub location: Option<GeoPoint>,
    /// Predicted time of death in POSIX seconds, if the triage model
    /// produced one. Absent means no hard deadline.
    pub predicted_death_epoch_secs: Option<f64>,
    /// Capabilities the receiving facility must provide (`true` entries).
    pub required_capabilities: BTreeMap<Capability, bool>,
    /// Resource counts the receiving facility must have available.
    pub required_resources: BTreeMap<Resource, u32>,
    pub deceased: bool,
}

impl Patient {
    pub fn new(id: impl Into<String>, acuity: Acuity) -> Self {
        Self {
            id: PatientId::new(id),
            acuity,
            location: None,
            predicted_death_epoch_secs: None,
            required_capabilities: BTreeMap::new(),
            required_resources: BTreeMap::new(),
            deceased: false,
        }
    }

    pub fn at(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_predicted_death(mut self, epoch_secs: f64) -> Self {
        self.predicted_death_epoch_secs = Some(epoch_secs);
        self
    }

    pub fn require_capability(mut self, capability: Capability) -> Self {
        self.required_capabilities.insert(capability, true);
        self
    }

    pub fn require_resource(mut self, resource: Resource, count: u32) -> Self {
        self.required_resources.insert(resource, count);
        self
    }

    pub fn mark_deceased(mut self) -> Self {
        self.deceased = true;
        self
    }

    /// True when the patient requires `capability`.
    pub fn requires(&self, capability: Capability) -> bool {
        self.required_capabilities
            .get(&capability)
            .copied()
            .unwrap_or(false)
    }

    /// Required count for `resource` (0 when not required).
    pub fn required_count(&self, resource: Resource) -> u32 {
        self.required_resources.get(&resource).copied().unwrap_or(0)
    }
}

/// A candidate healthcare facility.
///
/// `resources` counts are a snapshot of remaining capacity taken by the
/// caller; the engine never mutates or reserves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    /// 1 = Role 3 definitive, 2 = Role 2 surgical, 3 = Role 1 forward.
    pub level: u8,
    pub location: GeoPoint,
    pub capabilities: BTreeMap<Capability, bool>,
    pub resources: BTreeMap<Resource, u32>,
}

impl Facility {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u8,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: FacilityId::new(id),
            name: name.into(),
            level,
            location,
            capabilities: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability, true);
        self
    }

    pub fn with_resource(mut self, resource: Resource, count: u32) -> Self {
        self.resources.insert(resource, count);
        self
    }

    /// True when the facility advertises `capability`.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities
            .get(&capability)
            .copied()
            .unwrap_or(false)
    }

    /// Remaining capacity for `resource` (0 when absent).
    pub fn capacity(&self, resource: Resource) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// NATO role this facility provides, if its level is valid.
    pub fn role(&self) -> Option<EchelonRole> {
        EchelonRole::from_facility_level(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // Toronto city hall to St. Michael's, roughly 750 m apart
        let a = GeoPoint::new(43.6532, -79.3832);
        let b = GeoPoint::new(43.6591, -79.3877);
        let d = a.haversine_km(&b);
        assert!(d > 0.6 && d < 0.9, "distance was {}", d);
    }

    #[test]
    fn test_haversine_equator_degree() {
        // One degree of longitude at the equator is ~111.2 km
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let d = a.haversine_km(&b);
        assert!((d - 111.19).abs() < 0.1, "distance was {}", d);
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(-30.0, 40.0);
        assert_eq!(a.haversine_km(&a), 0.0);
        assert!((a.haversine_km(&b) - b.haversine_km(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(43.0, -79.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_capability_key_roundtrip() {
        for cap in Capability::ALL {
            assert_eq!(cap.key().parse::<Capability>().unwrap(), cap);
        }
        assert!("dialysis".parse::<Capability>().is_err());
    }

    #[test]
    fn test_resource_key_roundtrip() {
        for res in Resource::ALL {
            assert_eq!(res.key().parse::<Resource>().unwrap(), res);
        }
        assert!("mri_scanner".parse::<Resource>().is_err());
    }

    #[test]
    fn test_capability_serde_uses_snake_case() {
        let json = serde_json::to_string(&Capability::TraumaCenter).unwrap();
        assert_eq!(json, "\"trauma_center\"");
        let back: Capability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Capability::TraumaCenter);
        let res: Resource = serde_json::from_str("\"ordinary_icu\"").unwrap();
        assert_eq!(res, Resource::OrdinaryIcu);
    }

    #[test]
    fn test_incident_type_wire_names() {
        assert_eq!(serde_json::to_string(&IncidentType::Medevac).unwrap(), "\"MEDEVAC\"");
        assert_eq!("mci".parse::<IncidentType>().unwrap(), IncidentType::Mci);
        assert!("EVAC".parse::<IncidentType>().is_err());
    }

    #[test]
    fn test_echelon_role_level_mapping() {
        for role in EchelonRole::IN_EVACUATION_ORDER {
            assert_eq!(
                EchelonRole::from_facility_level(role.facility_level()),
                Some(role)
            );
        }
        assert_eq!(EchelonRole::from_facility_level(0), None);
        assert_eq!(EchelonRole::from_facility_level(4), None);
        assert_eq!(serde_json::to_string(&EchelonRole::Role1).unwrap(), "\"Role 1\"");
    }

    #[test]
    fn test_patient_builder_and_accessors() {
        let patient = Patient::new("P-1", Acuity::Immediate)
            .at(GeoPoint::new(1.0, 2.0))
            .with_predicted_death(1_700_000_000.0)
            .require_capability(Capability::Cardiac)
            .require_resource(Resource::Ventilator, 2);

        assert!(patient.requires(Capability::Cardiac));
        assert!(!patient.requires(Capability::Burn));
        assert_eq!(patient.required_count(Resource::Ventilator), 2);
        assert_eq!(patient.required_count(Resource::Ward), 0);
        assert!(!patient.deceased);
    }

    #[test]
    fn test_facility_builder_and_accessors() {
        let facility = Facility::new("F-1", "Alpha General", 1, GeoPoint::new(0.0, 0.0))
            .with_capability(Capability::TraumaCenter)
            .with_resource(Resource::OperatingRoom, 3);

        assert!(facility.has_capability(Capability::TraumaCenter));
        assert!(!facility.has_capability(Capability::Pediatric));
        assert_eq!(facility.capacity(Resource::OperatingRoom), 3);
        assert_eq!(facility.capacity(Resource::Isolation), 0);
        assert_eq!(facility.role(), Some(EchelonRole::Role3));
    }

    #[test]
    fn test_patient_json_map_keys() {
        let patient = Patient::new("P-9", Acuity::Delayed)
            .require_capability(Capability::TraumaCenter)
            .require_resource(Resource::PrbcUnit, 4);
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["required_capabilities"]["trauma_center"], true);
        assert_eq!(json["required_resources"]["prbc_unit"], 4);
    }
}
