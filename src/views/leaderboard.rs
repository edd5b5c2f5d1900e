use super::card;
use crate::{client::Client, model::LeaderboardEntry, utils::Result};
use iced::{
    widget::{button, column, horizontal_space, row, scrollable, text},
    Element, Length, Task,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Message {
    Open,
    Close,
    Loaded(Result<Vec<LeaderboardEntry>>),
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Closed,
    Loading,
    Loaded(Vec<LeaderboardEntry>),
    Failed,
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    state: State,
}

/// `1. jan – 12`
pub fn rank_line(rank: usize, entry: &LeaderboardEntry) -> String {
    format!("{}. {} – {}", rank + 1, entry.gebruiker, entry.aantal)
}

impl Leaderboard {
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, State::Closed)
    }

    pub fn update(&mut self, message: Message, client: &Arc<Client>) -> Task<Message> {
        match message {
            Message::Open => {
                self.state = State::Loading;
                let client = client.clone();
                Task::perform(
                    async move { client.leaderboard().await },
                    Message::Loaded,
                )
            }
            Message::Close => {
                self.state = State::Closed;
                Task::none()
            }
            Message::Loaded(result) => {
                // a late answer must not reopen a closed board
                if self.is_open() {
                    self.state = match result {
                        Ok(entries) => State::Loaded(entries),
                        Err(error) => {
                            tracing::error!(%error, "Fout bij laden leaderboard");
                            State::Failed
                        }
                    };
                }
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match &self.state {
            State::Closed => text("").into(),
            State::Loading => text("Laden…").into(),
            State::Failed => text("Kon leaderboard niet laden").into(),
            State::Loaded(entries) if entries.is_empty() => text("Nog geen schoten").into(),
            State::Loaded(entries) => scrollable(column(
                entries
                    .iter()
                    .enumerate()
                    .map(|(rank, entry)| text(rank_line(rank, entry)).into()),
            ))
            .height(Length::Fixed(320.0))
            .into(),
        };

        card(
            column![
                row![
                    text("Leaderboard").size(20),
                    horizontal_space(),
                    button("Sluiten")
                        .on_press(Message::Close)
                        .style(button::secondary),
                ],
                body,
            ]
            .spacing(12),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::anyio;

    fn entry(gebruiker: &str, aantal: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            gebruiker: gebruiker.into(),
            aantal,
        }
    }

    #[test]
    fn ranks_start_at_one() {
        assert_eq!(rank_line(0, &entry("jan", 12)), "1. jan – 12");
        assert_eq!(rank_line(2, &entry("piet", 3)), "3. piet – 3");
    }

    #[test]
    fn late_answer_stays_closed() {
        let mut board = Leaderboard::default();
        let client = Arc::new(Client::new(
            &crate::config::Config::default(),
            reqwest::Client::new(),
        ));
        let _ = board.update(Message::Loaded(Ok(vec![entry("jan", 1)])), &client);
        assert!(!board.is_open());

        board.state = State::Loading;
        let _ = board.update(Message::Loaded(Err(anyio!("offline"))), &client);
        assert!(matches!(board.state, State::Failed));
    }
}
