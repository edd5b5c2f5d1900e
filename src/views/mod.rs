pub mod hut;
pub mod leaderboard;
pub mod log;
pub mod login;
pub mod map;
pub mod prompt;
pub mod report;

pub use hut::HutPopup;
pub use leaderboard::Leaderboard;
pub use log::Log;
pub use login::Login;
pub use map::MapView;
pub use prompt::Prompt;
pub use report::Report;

use iced::{
    widget::{center, container, mouse_area, opaque, stack},
    Color, Element, Length,
};

/// Shows `content` above a dimmed `base`; clicking outside emits `on_blur`.
pub fn modal<'a, Message: Clone + 'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| container::Style {
                background: Some(
                    Color {
                        a: 0.7,
                        ..Color::BLACK
                    }
                    .into(),
                ),
                ..container::Style::default()
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

pub fn card<'a, Message: 'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .padding(16)
        .width(Length::Fixed(420.0))
        .style(container::rounded_box)
        .into()
}
