use iced::{
    widget::{button, column, container, row, scrollable, text},
    Color, Element, Length,
};

use hex_colors::color_from_hex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

macro_rules! hex {
    ($($tt:tt)*) => {{
        let [r, g, b]: [u8; 3] = color_from_hex!($($tt)*);
        Color::from_rgb(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        )
    }};
}

const GREEN: Color = hex!(0x3cb371);
const YELLOW: Color = hex!(0xffd700);
const RED: Color = hex!(0xff4500);

/// How many notifications stay on screen.
const VISIBLE: usize = 6;

impl Level {
    const fn as_color(self) -> Color {
        match self {
            Self::Info => GREEN,
            Self::Warn => YELLOW,
            Self::Error => RED,
        }
    }
}

/// User-facing notifications, newest first.
#[derive(Debug, Default)]
pub struct Log(Vec<(Level, String)>);

impl Log {
    pub fn info(&mut self, message: impl ToString) {
        let message = message.to_string();
        info!("{message}");
        self.0.push((Level::Info, message));
    }

    pub fn warn(&mut self, message: impl ToString) {
        let message = message.to_string();
        warn!("{message}");
        self.0.push((Level::Warn, message));
    }

    pub fn error(&mut self, message: impl ToString) {
        let message = message.to_string();
        error!("{message}");
        self.0.push((Level::Error, message));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn view<'a, Message: Clone + 'a>(&'a self, on_clear: Message) -> Element<'a, Message> {
        let lines = self
            .0
            .iter()
            .rev()
            .take(VISIBLE)
            .map(|(level, message)| text(message.as_str()).color(level.as_color()).into());

        container(row![
            scrollable(column(lines).spacing(2)).width(Length::Fill),
            button("x").on_press(on_clear).style(button::text),
        ])
        .padding(6)
        .width(Length::Fixed(420.0))
        .style(container::rounded_box)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_last_internally() {
        let mut log = Log::default();
        log.info("Ingelogd als jan");
        log.error("Fout bij het laden van markers");
        assert_eq!(log.0.last().map(|(level, _)| *level), Some(Level::Error));
        log.clear();
        assert!(log.is_empty());
    }
}
