//! Wind overlay data in the velocity-layer grid format: one `u` and one `v`
//! record over the same regular lat/lng grid.

use crate::{
    model::{LatLng, WindRecord},
    utils::{error::anyio, Result},
};

const U_COMPONENT: u32 = 2;
const V_COMPONENT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Metres per second.
    pub speed: f64,
    /// Compass degrees the wind blows *from*.
    pub from: f64,
}

impl Wind {
    pub fn from_components(u: f64, v: f64) -> Self {
        let speed = u.hypot(v);
        let from = (270.0 - v.atan2(u).to_degrees()).rem_euclid(360.0);
        Self { speed, from }
    }

    /// Compass degrees the wind blows *to*, for drawing arrows.
    pub fn towards(&self) -> f64 {
        (self.from + 180.0).rem_euclid(360.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindField {
    nx: usize,
    ny: usize,
    lo1: f64,
    la1: f64,
    dx: f64,
    dy: f64,
    u: Vec<Option<f64>>,
    v: Vec<Option<f64>>,
    pub ref_time: Option<String>,
}

impl WindField {
    pub fn from_records(records: Vec<WindRecord>) -> Result<Self> {
        let mut u = None;
        let mut v = None;
        for record in records {
            match record.header.parameter_number {
                U_COMPONENT => u = Some(record),
                V_COMPONENT => v = Some(record),
                other => tracing::debug!(other, "ignoring wind record"),
            }
        }
        let (Some(u), Some(v)) = (u, v) else {
            return Err(anyio!("wind data lacks u or v component"));
        };

        let header = &u.header;
        let cells = header.nx * header.ny;
        if u.data.len() != cells || v.data.len() != cells {
            return Err(anyio!(
                "wind grid {}x{} does not match {} / {} values",
                header.nx,
                header.ny,
                u.data.len(),
                v.data.len()
            ));
        }

        Ok(Self {
            nx: header.nx,
            ny: header.ny,
            lo1: header.lo1,
            la1: header.la1,
            dx: header.dx,
            dy: header.dy,
            ref_time: header.ref_time.clone(),
            u: u.data,
            v: v.data,
        })
    }

    /// Wind at the grid point nearest to `at`, if it is inside the grid.
    pub fn at(&self, at: LatLng) -> Option<Wind> {
        // rows run north to south starting at `la1`
        let col = ((at.lng - self.lo1) / self.dx).round();
        let row = ((self.la1 - at.lat) / self.dy).round();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (col as usize, row as usize);
        if col >= self.nx || row >= self.ny {
            return None;
        }
        let index = row * self.nx + col;
        Some(Wind::from_components(self.u[index]?, self.v[index]?))
    }

    /// Every defined grid point with its wind.
    #[allow(clippy::cast_precision_loss)]
    pub fn points(&self) -> impl Iterator<Item = (LatLng, Wind)> + '_ {
        (0..self.nx * self.ny).filter_map(move |index| {
            let (row, col) = (index / self.nx, index % self.nx);
            let at = LatLng::new(
                self.la1 - row as f64 * self.dy,
                self.lo1 + col as f64 * self.dx,
            );
            Some((at, Wind::from_components(self.u[index]?, self.v[index]?)))
        })
    }

    /// Mean vector over all defined grid points.
    pub fn mean(&self) -> Option<Wind> {
        let (count, u, v) = self
            .u
            .iter()
            .zip(&self.v)
            .filter_map(|(u, v)| Some((u.as_ref()?, v.as_ref()?)))
            .fold((0_u32, 0.0, 0.0), |(count, su, sv), (u, v)| {
                (count + 1, su + u, sv + v)
            });
        (count > 0).then(|| Wind::from_components(u / f64::from(count), v / f64::from(count)))
    }
}
