use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Zones travel as `[[lat, lng], ...]`.
impl Serialize for Vertex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.0.lat, self.0.lng].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vertex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pair([f64; 2]),
            Object(LatLng),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Pair([lat, lng]) => Self(LatLng { lat, lng }),
            Repr::Object(latlng) => Self(latlng),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex(pub LatLng);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hut {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub number: String,
    #[serde(default)]
    pub desc: String,
    pub lat: f64,
    pub lng: f64,
}

impl Hut {
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.name, self.number)
    }
}

fn number_or_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Float(f64),
        Str(String),
        Null(()),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Int(int) => int.to_string(),
        Repr::Float(float) => float.to_string(),
        Repr::Str(str) => str,
        Repr::Null(()) => String::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHut {
    pub name: String,
    pub number: String,
    pub desc: String,
    pub lat: f64,
    pub lng: f64,
}

impl NewHut {
    pub fn into_hut(self, id: i64) -> Hut {
        let Self {
            name,
            number,
            desc,
            lat,
            lng,
        } = self;
        Hut {
            id,
            name,
            number,
            desc,
            lat,
            lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneType {
    Grens,
    Voederplek,
    Voederzone,
    Wildakker,
    Bos,
    Other(String),
}

impl ZoneType {
    /// The types offered when drawing a new zone.
    pub const PICKABLE: [Self; 4] = [Self::Grens, Self::Voederplek, Self::Wildakker, Self::Bos];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Grens => "grens",
            Self::Voederplek => "voederplek",
            Self::Voederzone => "voederzone",
            Self::Wildakker => "wildakker",
            Self::Bos => "bos",
            Self::Other(other) => other,
        }
    }

    /// Boundaries are open polylines, everything else is a closed area.
    pub const fn is_line(&self) -> bool {
        matches!(self, Self::Grens)
    }

    pub const fn min_vertices(&self) -> usize {
        if self.is_line() {
            2
        } else {
            3
        }
    }
}

impl From<String> for ZoneType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "grens" => Self::Grens,
            "voederplek" => Self::Voederplek,
            "voederzone" => Self::Voederzone,
            "wildakker" => Self::Wildakker,
            "bos" => Self::Bos,
            _ => Self::Other(value),
        }
    }
}

impl From<ZoneType> for String {
    fn from(value: ZoneType) -> Self {
        match value {
            ZoneType::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for ZoneType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ZoneType,
    #[serde(default)]
    pub label: Option<String>,
    pub latlngs: Vec<Vertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewZone {
    #[serde(rename = "type")]
    pub kind: ZoneType,
    pub label: String,
    pub latlngs: Vec<Vertex>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: i64,
    pub hut_id: i64,
    pub soort: String,
    #[serde(default)]
    pub geslacht: Option<String>,
    #[serde(default)]
    pub gewicht_kg: Option<f64>,
    #[serde(default)]
    pub leeftijd_jr: Option<u32>,
    #[serde(default)]
    pub notities: Option<String>,
    pub shot_at: String,
    #[serde(default)]
    pub gebruiker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShot {
    pub hut_id: i64,
    pub soort: String,
    pub geslacht: Option<String>,
    pub gewicht_kg: Option<f64>,
    pub leeftijd_jr: Option<u32>,
    pub notities: Option<String>,
    pub shot_at: String,
}

/// A hunting session report ("sessie") posted for a hut.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum SightingSession {
    #[serde(rename = "niet-gezien")]
    NotSeen { hut_id: i64, timestamp: String },
    #[serde(rename = "wel-gezien")]
    Seen {
        hut_id: i64,
        soort: String,
        aantal: u32,
        mannetjes: u32,
        vrouwtjes: u32,
        jonkies: u32,
        tijd: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub gebruiker: String,
    pub aantal: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Token {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindHeader {
    #[serde(default)]
    pub parameter_category: Option<u32>,
    pub parameter_number: u32,
    pub nx: usize,
    pub ny: usize,
    pub lo1: f64,
    pub la1: f64,
    pub dx: f64,
    pub dy: f64,
    #[serde(default)]
    pub ref_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindRecord {
    pub header: WindHeader,
    pub data: Vec<Option<f64>>,
}
