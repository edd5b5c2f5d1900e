pub mod camera;
pub mod drawing;
pub mod state;
pub mod style;

pub use camera::{Camera, Pixel};
pub use state::{HutMode, MapAction, MapState, ZoneShape};
