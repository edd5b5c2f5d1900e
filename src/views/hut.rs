use super::card;
use crate::{
    client::Client,
    model::{Hut, Shot},
    session::Session,
    utils::{clock, Result},
};
use iced::{
    widget::{button, column, horizontal_space, row, scrollable, text},
    Alignment, Element, Length, Task,
};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone)]
pub enum Message {
    Close,
    Loaded(i64, Result<Vec<Shot>>),
    AskDeleteShot(i64),
    DeleteShot(i64),
    ShotDeleted(Result<()>),
    Report(i64),
}

#[derive(Debug, Default)]
enum Shots {
    #[default]
    Loading,
    Loaded(Vec<Shot>),
    Failed,
}

/// Details and shot history of one hut.
#[derive(Debug, Default)]
pub struct HutPopup {
    hut_id: Option<i64>,
    shots: Shots,
}

/// `01-05-2024 06:30 – ree bok, 18.5 kg`
pub fn history_line(shot: &Shot) -> String {
    let mut line = format!("{} – {}", clock::display(&shot.shot_at), shot.soort);
    if let Some(geslacht) = shot.geslacht.as_deref().filter(|g| !g.is_empty()) {
        line.push(' ');
        line.push_str(geslacht);
    }
    if let Some(weight) = shot.gewicht_kg.filter(|kg| *kg > 0.0) {
        line.push_str(&format!(", {weight} kg"));
    }
    line
}

impl HutPopup {
    pub const fn hut_id(&self) -> Option<i64> {
        self.hut_id
    }

    pub fn open(&mut self, hut_id: i64, client: &Arc<Client>) -> Task<Message> {
        self.hut_id = Some(hut_id);
        self.shots = Shots::Loading;
        let client = client.clone();
        Task::perform(
            async move { client.shots(hut_id).await },
            move |result| Message::Loaded(hut_id, result),
        )
    }

    pub fn close(&mut self) {
        self.hut_id = None;
    }

    pub fn update(&mut self, message: Message, client: &Arc<Client>) -> Task<Message> {
        match message {
            Message::Close => self.close(),
            Message::Loaded(hut_id, result) if Some(hut_id) == self.hut_id => {
                self.shots = match result {
                    Ok(shots) => Shots::Loaded(shots),
                    Err(err) => {
                        error!(%err, hut_id, "could not load shots");
                        Shots::Failed
                    }
                };
            }
            Message::DeleteShot(id) => {
                let client = client.clone();
                return Task::perform(
                    async move { client.delete_shot(id).await },
                    Message::ShotDeleted,
                );
            }
            Message::ShotDeleted(Ok(())) => {
                if let Some(hut_id) = self.hut_id {
                    return self.open(hut_id, client);
                }
            }
            // the parent reacts to these
            Message::Loaded(..)
            | Message::AskDeleteShot(_)
            | Message::ShotDeleted(Err(_))
            | Message::Report(_) => {}
        }
        Task::none()
    }

    pub fn view<'a>(&'a self, hut: &Hut, session: Option<&Session>) -> Element<'a, Message> {
        let history: Element<'a, Message> = match &self.shots {
            Shots::Loading => text("laden …").into(),
            Shots::Failed => text("Kon lijst niet laden").style(text::danger).into(),
            Shots::Loaded(shots) if shots.is_empty() => text("Geen schoten geregistreerd").into(),
            Shots::Loaded(shots) => column(shots.iter().map(|shot| {
                let line = text(history_line(shot));
                if session.is_some_and(|session| session.may_delete(shot)) {
                    row![
                        line,
                        horizontal_space(),
                        button("✖")
                            .on_press(Message::AskDeleteShot(shot.id))
                            .style(button::danger),
                    ]
                    .align_y(Alignment::Center)
                    .into()
                } else {
                    line.into()
                }
            }))
            .spacing(4)
            .into(),
        };

        let report = session.map(|_| {
            button("Voeg rapportage toe").on_press(Message::Report(hut.id))
        });

        card(
            column![
                row![
                    text(hut.title()).size(20),
                    horizontal_space(),
                    button("Sluiten")
                        .on_press(Message::Close)
                        .style(button::secondary),
                ],
                text(hut.desc.clone()),
                scrollable(history).height(Length::Shrink),
            ]
            .push_maybe(report)
            .spacing(10),
        )
    }
}
