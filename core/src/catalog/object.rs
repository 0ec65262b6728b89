use crate::geometry::Vector3;
use crate::prelude::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized classification of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Active,
    Junk,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 2] = [ObjectKind::Active, ObjectKind::Junk];

    /// Maps a catalog object type onto a kind. `PAYLOAD`, `ACTIVE` and `SATELLITE` are
    /// active; debris, rocket bodies and anything unrecognized are junk.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PAYLOAD" | "ACTIVE" | "SATELLITE" => ObjectKind::Active,
            _ => ObjectKind::Junk,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Active => "active",
            ObjectKind::Junk => "junk",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown object kind '{s}'"))
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Country/operator bucket. Closed set plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "US")]
    UnitedStates,
    Russia,
    China,
    Japan,
    India,
    France,
    #[serde(rename = "UK")]
    UnitedKingdom,
    #[serde(rename = "ESA")]
    Esa,
    Other,
}

impl Origin {
    pub const ALL: [Origin; 9] = [
        Origin::UnitedStates,
        Origin::Russia,
        Origin::China,
        Origin::Japan,
        Origin::India,
        Origin::France,
        Origin::UnitedKingdom,
        Origin::Esa,
        Origin::Other,
    ];

    /// Buckets a raw country or operator code. Unknown codes land in `Other`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "US" | "USA" | "UNITED STATES" => Origin::UnitedStates,
            "CIS" | "RU" | "RUS" | "RUSSIA" | "USSR" => Origin::Russia,
            "PRC" | "CN" | "CHN" | "CHINA" => Origin::China,
            "JPN" | "JP" | "JAPAN" => Origin::Japan,
            "IND" | "IN" | "INDIA" => Origin::India,
            "FR" | "FRA" | "FRANCE" => Origin::France,
            "UK" | "GB" | "GBR" | "UNITED KINGDOM" => Origin::UnitedKingdom,
            "ESA" | "ESRO" => Origin::Esa,
            _ => Origin::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::UnitedStates => "US",
            Origin::Russia => "Russia",
            Origin::China => "China",
            Origin::Japan => "Japan",
            Origin::India => "India",
            Origin::France => "France",
            Origin::UnitedKingdom => "UK",
            Origin::Esa => "ESA",
            Origin::Other => "Other",
        }
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|origin| origin.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| format!("unknown origin '{s}'"))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six fixed altitude ranges used for color coding and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AltitudeBin {
    Below200,
    From200To400,
    From400To800,
    From800To1200,
    From1200To2000,
    Above2000,
}

impl AltitudeBin {
    pub const ALL: [AltitudeBin; 6] = [
        AltitudeBin::Below200,
        AltitudeBin::From200To400,
        AltitudeBin::From400To800,
        AltitudeBin::From800To1200,
        AltitudeBin::From1200To2000,
        AltitudeBin::Above2000,
    ];

    /// Lower bounds are inclusive. Negative altitudes fall in the lowest bin and
    /// non-finite ones in the highest.
    pub fn from_altitude_km(altitude_km: f64) -> Self {
        if altitude_km < 200.0 {
            AltitudeBin::Below200
        } else if altitude_km < 400.0 {
            AltitudeBin::From200To400
        } else if altitude_km < 800.0 {
            AltitudeBin::From400To800
        } else if altitude_km < 1200.0 {
            AltitudeBin::From800To1200
        } else if altitude_km < 2000.0 {
            AltitudeBin::From1200To2000
        } else {
            AltitudeBin::Above2000
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AltitudeBin::Below200 => "0-200",
            AltitudeBin::From200To400 => "200-400",
            AltitudeBin::From400To800 => "400-800",
            AltitudeBin::From800To1200 => "800-1200",
            AltitudeBin::From1200To2000 => "1200-2000",
            AltitudeBin::Above2000 => "2000+",
        }
    }
}

impl FromStr for AltitudeBin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bin| bin.label() == s.trim())
            .ok_or_else(|| format!("unknown altitude bin '{s}'"))
    }
}

impl TryFrom<String> for AltitudeBin {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AltitudeBin> for String {
    fn from(bin: AltitudeBin) -> Self {
        bin.label().to_string()
    }
}

impl fmt::Display for AltitudeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tracked physical object as held by the reconciliation cache.
///
/// Position-derived fields are only written together through [`TrackedObject::relocate`],
/// and `visible` only by the visibility engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    id: ObjectId,
    kind: ObjectKind,
    origin: Origin,
    position: Vector3,
    altitude_km: f64,
    altitude_bin: AltitudeBin,
    velocity: Option<Vector3>,
    pub(crate) visible: bool,
}

impl TrackedObject {
    pub(crate) fn new(id: ObjectId, kind: ObjectKind, origin: Origin) -> Self {
        Self {
            id,
            kind,
            origin,
            position: Vector3::ZERO,
            altitude_km: 0.0,
            altitude_bin: AltitudeBin::from_altitude_km(0.0),
            velocity: None,
            visible: false,
        }
    }

    pub(crate) fn relocate(
        &mut self,
        position: Vector3,
        altitude_km: f64,
        velocity: Option<Vector3>,
    ) {
        self.position = position;
        self.altitude_km = altitude_km;
        self.altitude_bin = AltitudeBin::from_altitude_km(altitude_km);
        self.velocity = velocity;
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn altitude_bin(&self) -> AltitudeBin {
        self.altitude_bin
    }

    pub fn velocity(&self) -> Option<Vector3> {
        self.velocity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_boundaries_are_lower_inclusive() {
        assert_eq!(AltitudeBin::from_altitude_km(-50.0), AltitudeBin::Below200);
        assert_eq!(AltitudeBin::from_altitude_km(199.9), AltitudeBin::Below200);
        assert_eq!(AltitudeBin::from_altitude_km(200.0), AltitudeBin::From200To400);
        assert_eq!(AltitudeBin::from_altitude_km(621.863), AltitudeBin::From400To800);
        assert_eq!(AltitudeBin::from_altitude_km(1200.0), AltitudeBin::From1200To2000);
        assert_eq!(AltitudeBin::from_altitude_km(35_786.0), AltitudeBin::Above2000);
        assert_eq!(AltitudeBin::from_altitude_km(f64::NAN), AltitudeBin::Above2000);
    }

    #[test]
    fn bin_labels_parse_back() {
        for bin in AltitudeBin::ALL {
            assert_eq!(bin.label().parse::<AltitudeBin>().unwrap(), bin);
        }
        assert!("300-500".parse::<AltitudeBin>().is_err());
        assert_eq!(serde_json::to_string(&AltitudeBin::Above2000).unwrap(), "\"2000+\"");
    }

    #[test]
    fn raw_codes_normalize_into_closed_sets() {
        assert_eq!(ObjectKind::normalize("payload"), ObjectKind::Active);
        assert_eq!(ObjectKind::normalize("Satellite"), ObjectKind::Active);
        assert_eq!(ObjectKind::normalize("ACTIVE"), ObjectKind::Active);
        assert_eq!(ObjectKind::normalize("DEBRIS"), ObjectKind::Junk);
        assert_eq!(ObjectKind::normalize("ROCKET BODY"), ObjectKind::Junk);
        assert_eq!(ObjectKind::normalize(""), ObjectKind::Junk);
        assert_eq!(Origin::normalize("PRC"), Origin::China);
        assert_eq!(Origin::normalize(" cis "), Origin::Russia);
        assert_eq!(Origin::normalize("ISRA"), Origin::Other);
        assert_eq!("uk".parse::<Origin>().unwrap(), Origin::UnitedKingdom);
        assert_eq!("JUNK".parse::<ObjectKind>().unwrap(), ObjectKind::Junk);
    }

    #[test]
    fn relocation_keeps_bin_in_step_with_altitude() {
        let mut object = TrackedObject::new(ObjectId(3), ObjectKind::Active, Origin::Japan);
        object.relocate(Vector3::new(1.0, 0.0, 0.0), 950.0, None);
        assert_eq!(object.altitude_bin(), AltitudeBin::From800To1200);
        object.relocate(Vector3::new(2.0, 0.0, 0.0), 150.0, Some(Vector3::ZERO));
        assert_eq!(object.altitude_bin(), AltitudeBin::Below200);
        assert!(!object.is_visible());
    }
}
