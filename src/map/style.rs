use crate::model::ZoneType;
use hex_colors::color_from_hex;
use iced::Color;

macro_rules! hex {
    ($($tt:tt)*) => {{
        let [r, g, b]: [u8; 3] = color_from_hex!($($tt)*);
        Color::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }};
}

pub const SIENNA: Color = hex!(0xa0522d);
pub const YELLOW: Color = hex!(0xffff00);
pub const GREEN: Color = hex!(0x008000);
pub const RED: Color = hex!(0xff0000);
pub const BLUE: Color = hex!(0x0000ff);
pub const WHITE: Color = hex!(0xffffff);
pub const LOCATION: Color = hex!("#4285f4");
pub const HANDLE: Color = hex!("#ff8c00");
pub const GRATICULE: Color = hex!("#3a3f44");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStyle {
    pub stroke: Color,
    pub width: f32,
    /// `None` for open boundaries.
    pub fill: Option<Color>,
}

impl ZoneStyle {
    const fn area(color: Color, opacity: f32) -> Self {
        Self {
            stroke: color,
            width: 3.0,
            fill: Some(Color { a: opacity, ..color }),
        }
    }
}

pub fn zone_style(kind: &ZoneType) -> ZoneStyle {
    match kind {
        ZoneType::Voederplek | ZoneType::Voederzone => ZoneStyle::area(SIENNA, 0.5),
        ZoneType::Wildakker => ZoneStyle::area(YELLOW, 0.5),
        ZoneType::Bos => ZoneStyle::area(GREEN, 0.5),
        ZoneType::Grens => ZoneStyle {
            stroke: RED,
            width: 3.0,
            fill: None,
        },
        ZoneType::Other(_) => ZoneStyle::area(BLUE, 0.3),
    }
}
