use crate::model::{LatLng, ZoneType};
use tinyvec::TinyVec;

pub type Points = TinyVec<[LatLng; 8]>;

/// Zone drawing: pick a type, click vertices, confirm.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Drawing {
    #[default]
    Idle,
    ChoosingType,
    Drawing {
        kind: ZoneType,
        points: Points,
    },
}

impl Drawing {
    pub const fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub const fn is_choosing(&self) -> bool {
        matches!(self, Self::ChoosingType)
    }

    /// Shows or hides the zone type choice.
    pub fn toggle_types(&mut self) {
        *self = match self {
            Self::ChoosingType => Self::Idle,
            _ => Self::ChoosingType,
        };
    }

    /// Starts a fresh drawing, dropping any points placed before.
    pub fn start(&mut self, kind: ZoneType) {
        *self = Self::Drawing {
            kind,
            points: Points::default(),
        };
    }

    /// Returns whether the point was taken.
    pub fn add_point(&mut self, at: LatLng) -> bool {
        match self {
            Self::Drawing { points, .. } => {
                points.push(at);
                true
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> Option<&ZoneType> {
        match self {
            Self::Drawing { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn points(&self) -> &[LatLng] {
        match self {
            Self::Drawing { points, .. } => points.as_slice(),
            _ => &[],
        }
    }

    pub fn can_confirm(&self) -> bool {
        match self {
            Self::Drawing { kind, points } => points.len() >= kind.min_vertices(),
            _ => false,
        }
    }

    /// The finished shape; drawing state stays until [`Self::cancel`].
    pub fn pending(&self) -> Option<(ZoneType, Vec<LatLng>)> {
        match self {
            Self::Drawing { kind, points } if self.can_confirm() => {
                Some((kind.clone(), points.to_vec()))
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }
}
