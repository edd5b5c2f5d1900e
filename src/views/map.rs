//! The map canvas: zones, huts, the hunting area outline and the wind
//! overlay, drawn over a plain graticule.

use crate::{
    map::{
        camera::{contains, distance_to_polyline},
        style::{self, zone_style},
        Camera, MapState, Pixel,
    },
    model::LatLng,
    wind::WindField,
};
use iced::{
    mouse,
    widget::canvas::{self, event, Canvas, Frame, Geometry, LineDash, Path, Stroke, Text},
    Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Theme,
};

const HUT_RADIUS: f64 = 10.0;
const HANDLE_RADIUS: f64 = 8.0;
const LINE_TOLERANCE: f64 = 6.0;
/// Pointer travel before a press turns into a pan.
const DRAG_THRESHOLD: f32 = 4.0;
const DASH: [f32; 2] = [8.0, 6.0];

#[derive(Debug, Clone)]
pub enum Message {
    Clicked(LatLng),
    HutClicked(i64),
    ZoneClicked(usize),
    VertexMoved { vertex: usize, to: LatLng },
    VertexReleased,
    Panned(Pixel),
    Zoomed { steps: f64, cursor: Pixel, viewport: Pixel },
}

#[derive(Debug, Default)]
pub enum Interaction {
    #[default]
    None,
    Pressed {
        origin: Point,
        last: Point,
        moved: bool,
    },
    Dragging {
        vertex: usize,
    },
}

pub struct MapView<'a> {
    state: &'a MapState,
    camera: &'a Camera,
    wind: Option<&'a WindField>,
    bounds: &'a [LatLng],
    show_wind: bool,
}

fn pixel(point: Point) -> Pixel {
    Pixel::new(f64::from(point.x), f64::from(point.y))
}

#[allow(clippy::cast_possible_truncation)]
fn point(pixel: Pixel) -> Point {
    Point::new(pixel.x as f32, pixel.y as f32)
}

fn viewport(size: Size) -> Pixel {
    Pixel::new(f64::from(size.width), f64::from(size.height))
}

/// Nearest hut within reach of `at`.
pub fn hut_at(state: &MapState, camera: &Camera, viewport: Pixel, at: Pixel) -> Option<i64> {
    state
        .huts
        .iter()
        .map(|hut| (hut.id, camera.to_screen(hut.position(), viewport).distance(at)))
        .filter(|(_, distance)| *distance <= HUT_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Top-most zone under `at`. Areas hit inside or near their outline, lines
/// only near the line itself.
pub fn zone_at(state: &MapState, camera: &Camera, viewport: Pixel, at: Pixel) -> Option<usize> {
    state.zones.iter().enumerate().rev().find_map(|(index, zone)| {
        let mut outline: Vec<_> = zone
            .latlngs
            .iter()
            .map(|latlng| camera.to_screen(*latlng, viewport))
            .collect();
        if !zone.kind.is_line() {
            if contains(&outline, at) {
                return Some(index);
            }
            if let Some(first) = outline.first().copied() {
                outline.push(first);
            }
        }
        distance_to_polyline(at, &outline)
            .filter(|distance| *distance <= LINE_TOLERANCE)
            .map(|_| index)
    })
}

/// Vertex handle of the selected zone under `at`.
pub fn handle_at(state: &MapState, camera: &Camera, viewport: Pixel, at: Pixel) -> Option<usize> {
    state.selected_zone()?.latlngs.iter().position(|latlng| {
        camera.to_screen(*latlng, viewport).distance(at) <= HANDLE_RADIUS
    })
}

impl<'a> MapView<'a> {
    pub fn new(
        state: &'a MapState,
        camera: &'a Camera,
        wind: Option<&'a WindField>,
        bounds: &'a [LatLng],
        show_wind: bool,
    ) -> Self {
        Self {
            state,
            camera,
            wind,
            bounds,
            show_wind,
        }
    }

    pub fn view(self) -> Element<'a, Message> {
        Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn click(&self, at: Pixel, viewport: Pixel) -> Message {
        let latlng = self.camera.to_latlng(at, viewport);
        // while drawing, every click places a vertex
        if self.state.drawing.is_drawing() {
            return Message::Clicked(latlng);
        }
        if let Some(id) = hut_at(self.state, self.camera, viewport, at) {
            return Message::HutClicked(id);
        }
        if let Some(index) = zone_at(self.state, self.camera, viewport, at) {
            return Message::ZoneClicked(index);
        }
        Message::Clicked(latlng)
    }

    fn screen(&self, latlng: LatLng, viewport: Pixel) -> Point {
        point(self.camera.to_screen(latlng, viewport))
    }

    fn outline(&self, latlngs: &[LatLng], viewport: Pixel, closed: bool) -> Path {
        Path::new(|builder| {
            let mut points = latlngs.iter().map(|latlng| self.screen(*latlng, viewport));
            if let Some(first) = points.next() {
                builder.move_to(first);
                points.for_each(|point| builder.line_to(point));
                if closed {
                    builder.close();
                }
            }
        })
    }

    fn draw_graticule(&self, frame: &mut Frame, viewport: Pixel) {
        let step = match self.camera.zoom() {
            zoom if zoom >= 14.0 => 0.01,
            zoom if zoom >= 12.0 => 0.05,
            _ => 0.1,
        };
        let north_west = self.camera.to_latlng(Pixel::default(), viewport);
        let south_east = self.camera.to_latlng(viewport, viewport);
        let stroke = Stroke::default()
            .with_color(style::GRATICULE)
            .with_width(1.0);

        let mut lng = (north_west.lng / step).floor() * step;
        while lng <= south_east.lng {
            let x = self.screen(LatLng::new(north_west.lat, lng), viewport).x;
            frame.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, frame.height())),
                stroke,
            );
            lng += step;
        }
        let mut lat = (south_east.lat / step).floor() * step;
        while lat <= north_west.lat {
            let y = self.screen(LatLng::new(lat, north_west.lng), viewport).y;
            frame.stroke(
                &Path::line(Point::new(0.0, y), Point::new(frame.width(), y)),
                stroke,
            );
            lat += step;
        }
    }

    fn draw_zones(&self, frame: &mut Frame, viewport: Pixel) {
        let selected = self.state.selected_index();
        for (index, zone) in self.state.zones.iter().enumerate() {
            let paint = zone_style(&zone.kind);
            let path = self.outline(&zone.latlngs, viewport, !zone.kind.is_line());
            if let Some(fill) = paint.fill {
                frame.fill(&path, fill);
            }
            let width = if selected == Some(index) {
                paint.width + 2.0
            } else {
                paint.width
            };
            frame.stroke(
                &path,
                Stroke::default().with_color(paint.stroke).with_width(width),
            );
        }

        if let Some(zone) = self.state.selected_zone() {
            #[allow(clippy::cast_possible_truncation)]
            let radius = HANDLE_RADIUS as f32 * 0.6;
            for latlng in &zone.latlngs {
                let handle = Path::circle(self.screen(*latlng, viewport), radius);
                frame.fill(&handle, style::HANDLE);
                frame.stroke(&handle, Stroke::default().with_color(style::WHITE));
            }
        }
    }

    fn draw_pending(&self, frame: &mut Frame, viewport: Pixel) {
        let Some(kind) = self.state.drawing.kind() else {
            return;
        };
        let points = self.state.drawing.points();
        let color = zone_style(kind).stroke;
        frame.stroke(
            &self.outline(points, viewport, false),
            Stroke {
                line_dash: LineDash {
                    segments: &DASH,
                    offset: 0,
                },
                ..Stroke::default().with_color(color).with_width(2.0)
            },
        );
        for latlng in points {
            frame.fill(&Path::circle(self.screen(*latlng, viewport), 4.0), color);
        }
    }

    fn draw_huts(&self, frame: &mut Frame, viewport: Pixel) {
        for hut in &self.state.huts {
            let at = self.screen(hut.position(), viewport);
            let marker = Path::circle(at, 6.0);
            frame.fill(&marker, style::LOCATION);
            frame.stroke(
                &marker,
                Stroke::default().with_color(style::WHITE).with_width(2.0),
            );
            frame.fill_text(Text {
                content: hut.title(),
                position: Point::new(at.x + 9.0, at.y - 16.0),
                color: style::WHITE,
                size: Pixels(13.0),
                ..Text::default()
            });
        }
    }

    fn draw_wind(&self, frame: &mut Frame, viewport: Pixel) {
        let Some(wind) = self.wind.filter(|_| self.show_wind) else {
            return;
        };
        let stroke = Stroke::default().with_color(style::WHITE).with_width(1.5);
        for (latlng, sample) in wind.points() {
            let from = self.screen(latlng, viewport);
            if from.x < 0.0 || from.y < 0.0 || from.x > frame.width() || from.y > frame.height() {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let (length, heading) = (
                (12.0 + sample.speed * 2.0).min(40.0) as f32,
                sample.towards().to_radians() as f32,
            );
            let (dx, dy) = (heading.sin(), -heading.cos());
            let tip = Point::new(from.x + dx * length, from.y + dy * length);
            frame.stroke(&Path::line(from, tip), stroke);
            frame.fill(
                &Path::new(|builder| {
                    builder.move_to(tip);
                    builder.line_to(Point::new(tip.x - dx * 6.0 - dy * 3.0, tip.y - dy * 6.0 + dx * 3.0));
                    builder.line_to(Point::new(tip.x - dx * 6.0 + dy * 3.0, tip.y - dy * 6.0 - dx * 3.0));
                    builder.close();
                }),
                style::WHITE,
            );
        }

        if let Some(mean) = wind.mean() {
            let mut summary = format!("Wind: {:.1} m/s uit {:.0}°", mean.speed, mean.from);
            if let Some(ref_time) = &wind.ref_time {
                summary.push_str(&format!(" ({})", crate::utils::clock::display(ref_time)));
            }
            frame.fill_text(Text {
                content: summary,
                position: Point::new(12.0, 12.0),
                color: style::WHITE,
                size: Pixels(14.0),
                ..Text::default()
            });
        }
    }
}

impl<'a> canvas::Program<Message> for MapView<'a> {
    type State = Interaction;

    fn update(
        &self,
        interaction: &mut Interaction,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let viewport = viewport(bounds.size());

        if let canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) = event {
            let message = match std::mem::take(interaction) {
                Interaction::Dragging { .. } => Some(Message::VertexReleased),
                Interaction::Pressed { origin, moved, .. } if !moved => {
                    Some(self.click(pixel(origin), viewport))
                }
                _ => None,
            };
            return (event::Status::Captured, message);
        }

        let Some(position) = cursor.position_in(bounds) else {
            return (event::Status::Ignored, None);
        };

        let canvas::Event::Mouse(event) = event else {
            return (event::Status::Ignored, None);
        };

        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                *interaction = match handle_at(self.state, self.camera, viewport, pixel(position)) {
                    Some(vertex) if !self.state.drawing.is_drawing() => {
                        Interaction::Dragging { vertex }
                    }
                    _ => Interaction::Pressed {
                        origin: position,
                        last: position,
                        moved: false,
                    },
                };
                (event::Status::Captured, None)
            }
            mouse::Event::CursorMoved { .. } => match interaction {
                Interaction::Dragging { vertex } => (
                    event::Status::Captured,
                    Some(Message::VertexMoved {
                        vertex: *vertex,
                        to: self.camera.to_latlng(pixel(position), viewport),
                    }),
                ),
                Interaction::Pressed {
                    origin,
                    last,
                    moved,
                } => {
                    if !*moved && origin.distance(position) < DRAG_THRESHOLD {
                        return (event::Status::Captured, None);
                    }
                    *moved = true;
                    let delta = Pixel::new(
                        f64::from(position.x - last.x),
                        f64::from(position.y - last.y),
                    );
                    *last = position;
                    (event::Status::Captured, Some(Message::Panned(delta)))
                }
                Interaction::None => (event::Status::Ignored, None),
            },
            mouse::Event::WheelScrolled { delta } => {
                let steps = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => f64::from(y) * 0.5,
                    mouse::ScrollDelta::Pixels { y, .. } => f64::from(y) / 100.0,
                };
                (
                    event::Status::Captured,
                    Some(Message::Zoomed {
                        steps,
                        cursor: pixel(position),
                        viewport,
                    }),
                )
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _interaction: &Interaction,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let viewport = viewport(bounds.size());
        let mut frame = Frame::new(renderer, bounds.size());

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb8(0x1b, 0x24, 0x1d));
        self.draw_graticule(&mut frame, viewport);
        frame.stroke(
            &self.outline(self.bounds, viewport, true),
            Stroke {
                line_dash: LineDash {
                    segments: &DASH,
                    offset: 0,
                },
                ..Stroke::default().with_color(style::WHITE).with_width(2.0)
            },
        );
        self.draw_zones(&mut frame, viewport);
        self.draw_pending(&mut frame, viewport);
        self.draw_huts(&mut frame, viewport);
        self.draw_wind(&mut frame, viewport);

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        interaction: &Interaction,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        match interaction {
            Interaction::Dragging { .. } | Interaction::Pressed { moved: true, .. } => {
                mouse::Interaction::Grabbing
            }
            _ if self.state.drawing.is_drawing() && cursor.is_over(bounds) => {
                mouse::Interaction::Crosshair
            }
            _ => mouse::Interaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapConfig,
        model::{Hut, Vertex, Zone, ZoneType},
    };

    const VIEWPORT: Pixel = Pixel::new(800.0, 600.0);

    fn fixture() -> (MapState, Camera) {
        let config = MapConfig::default();
        let camera = Camera::new(&config);
        let center = camera.center();
        let offset = |dx: f64, dy: f64| {
            camera.to_latlng(Pixel::new(400.0 + dx, 300.0 + dy), VIEWPORT)
        };

        let mut state = MapState::default();
        state.replace_huts(vec![Hut {
            id: 1,
            name: "Eik".into(),
            number: "1".into(),
            desc: String::new(),
            lat: center.lat,
            lng: center.lng,
        }]);
        state.replace_zones(vec![
            Zone {
                id: 10,
                kind: ZoneType::Bos,
                label: None,
                latlngs: [offset(50.0, 50.0), offset(150.0, 50.0), offset(150.0, 150.0), offset(50.0, 150.0)]
                    .into_iter()
                    .map(Vertex)
                    .collect(),
            },
            Zone {
                id: 11,
                kind: ZoneType::Grens,
                label: None,
                latlngs: vec![Vertex(offset(-200.0, -100.0)), Vertex(offset(-100.0, -100.0))],
            },
        ]);
        (state, camera)
    }

    #[test]
    fn huts_hit_within_radius() {
        let (state, camera) = fixture();
        assert_eq!(hut_at(&state, &camera, VIEWPORT, Pixel::new(405.0, 305.0)), Some(1));
        assert_eq!(hut_at(&state, &camera, VIEWPORT, Pixel::new(420.0, 300.0)), None);
    }

    #[test]
    fn areas_hit_inside() {
        let (state, camera) = fixture();
        assert_eq!(zone_at(&state, &camera, VIEWPORT, Pixel::new(500.0, 400.0)), Some(0));
        assert_eq!(zone_at(&state, &camera, VIEWPORT, Pixel::new(553.0, 400.0)), Some(0));
        assert_eq!(zone_at(&state, &camera, VIEWPORT, Pixel::new(600.0, 400.0)), None);
    }

    #[test]
    fn lines_hit_near_line_only() {
        let (state, camera) = fixture();
        assert_eq!(zone_at(&state, &camera, VIEWPORT, Pixel::new(250.0, 203.0)), Some(1));
        assert_eq!(zone_at(&state, &camera, VIEWPORT, Pixel::new(250.0, 220.0)), None);
    }

    #[test]
    fn handles_need_selection() {
        let (mut state, camera) = fixture();
        let corner = Pixel::new(452.0, 351.0);
        assert_eq!(handle_at(&state, &camera, VIEWPORT, corner), None);
        state.select_zone(0);
        assert_eq!(handle_at(&state, &camera, VIEWPORT, corner), Some(0));
    }

    #[test]
    fn clicks_while_drawing_place_points() {
        let (mut state, camera) = fixture();
        let bounds = MapConfig::default().bounds;
        let view = MapView::new(&state, &camera, None, &bounds, false);
        assert!(matches!(view.click(Pixel::new(400.0, 300.0), VIEWPORT), Message::HutClicked(1)));
        assert!(matches!(view.click(Pixel::new(500.0, 400.0), VIEWPORT), Message::ZoneClicked(0)));

        state.drawing.start(ZoneType::Bos);
        let view = MapView::new(&state, &camera, None, &bounds, false);
        assert!(matches!(view.click(Pixel::new(400.0, 300.0), VIEWPORT), Message::Clicked(_)));
    }
}
