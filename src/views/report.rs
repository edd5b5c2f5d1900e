//! Reporting flow for a hut: a choice, then a sighting and/or a shot.

use super::card;
use crate::{
    client::Client,
    model::{NewShot, SightingSession},
    utils::{clock, Result},
};
use iced::{
    widget::{button, column, horizontal_space, row, text, text_input, TextInput},
    Element, Task,
};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Choice,
    Sighting,
    Shot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightingField {
    Soort,
    Aantal,
    Mannetjes,
    Vrouwtjes,
    Jonkies,
    Tijd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotField {
    Soort,
    Geslacht,
    Gewicht,
    Leeftijd,
    Notities,
    Tijd,
}

#[derive(Debug, Clone)]
pub enum Message {
    NotSeen,
    Seen,
    Cancel,
    Sighting(SightingField, String),
    Shot(ShotField, String),
    SaveSighting,
    ContinueToShot,
    BackToSighting,
    SubmitShot,
    Reported(i64, Result<()>),
    ShotSaved(i64, Result<()>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SightingForm {
    pub soort: String,
    pub aantal: String,
    pub mannetjes: String,
    pub vrouwtjes: String,
    pub jonkies: String,
    pub tijd: String,
}

fn count(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

impl SightingForm {
    /// Nothing to send while no species is filled in.
    pub fn to_session(&self, hut_id: i64) -> Option<SightingSession> {
        let soort = optional(&self.soort)?;
        Some(SightingSession::Seen {
            hut_id,
            soort,
            aantal: count(&self.aantal),
            mannetjes: count(&self.mannetjes),
            vrouwtjes: count(&self.vrouwtjes),
            jonkies: count(&self.jonkies),
            tijd: self.tijd.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotForm {
    pub soort: String,
    pub geslacht: String,
    pub gewicht: String,
    pub leeftijd: String,
    pub notities: String,
    pub shot_at: String,
}

impl ShotForm {
    pub fn time_is_valid(&self) -> bool {
        clock::is_valid_input(self.shot_at.trim())
    }

    /// Needs a species and a readable time.
    pub fn to_shot(&self, hut_id: i64) -> Option<NewShot> {
        if !self.time_is_valid() {
            return None;
        }
        Some(NewShot {
            hut_id,
            soort: optional(&self.soort)?,
            geslacht: optional(&self.geslacht),
            gewicht_kg: self
                .gewicht
                .trim()
                .replace(',', ".")
                .parse()
                .ok()
                .filter(|kg: &f64| *kg > 0.0),
            leeftijd_jr: self.leeftijd.trim().parse().ok().filter(|jr| *jr > 0),
            notities: optional(&self.notities),
            shot_at: self.shot_at.trim().to_owned(),
        })
    }
}

#[derive(Debug, Default)]
pub struct Report {
    hut_id: Option<i64>,
    step: Option<Step>,
    pending: bool,
    sighting: SightingForm,
    shot: ShotForm,
}

impl Report {
    pub fn open(&mut self, hut_id: i64) {
        *self = Self {
            hut_id: Some(hut_id),
            step: Some(Step::Choice),
            sighting: SightingForm {
                tijd: clock::now_input(),
                ..SightingForm::default()
            },
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub const fn is_open(&self) -> bool {
        self.step.is_some()
    }

    pub fn update(&mut self, message: Message, client: &Arc<Client>) -> Task<Message> {
        let Some(hut_id) = self.hut_id else {
            return Task::none();
        };

        match message {
            Message::Cancel => self.close(),
            Message::NotSeen => {
                self.close();
                let client = client.clone();
                let session = SightingSession::NotSeen {
                    hut_id,
                    timestamp: clock::now_iso(),
                };
                return Task::perform(
                    async move { client.report(&session).await },
                    move |result| Message::Reported(hut_id, result),
                );
            }
            Message::Seen | Message::BackToSighting => self.step = Some(Step::Sighting),
            Message::ContinueToShot => {
                self.shot.shot_at = clock::now_input();
                self.step = Some(Step::Shot);
            }
            Message::Sighting(field, value) => {
                let form = &mut self.sighting;
                *match field {
                    SightingField::Soort => &mut form.soort,
                    SightingField::Aantal => &mut form.aantal,
                    SightingField::Mannetjes => &mut form.mannetjes,
                    SightingField::Vrouwtjes => &mut form.vrouwtjes,
                    SightingField::Jonkies => &mut form.jonkies,
                    SightingField::Tijd => &mut form.tijd,
                } = value;
            }
            Message::Shot(field, value) => {
                let form = &mut self.shot;
                *match field {
                    ShotField::Soort => &mut form.soort,
                    ShotField::Geslacht => &mut form.geslacht,
                    ShotField::Gewicht => &mut form.gewicht,
                    ShotField::Leeftijd => &mut form.leeftijd,
                    ShotField::Notities => &mut form.notities,
                    ShotField::Tijd => &mut form.shot_at,
                } = value;
            }
            Message::SaveSighting => {
                let Some(session) = self.sighting.to_session(hut_id) else {
                    return Task::none();
                };
                self.pending = true;
                let client = client.clone();
                return Task::perform(
                    async move { client.report(&session).await },
                    move |result| Message::Reported(hut_id, result),
                );
            }
            Message::SubmitShot => {
                let Some(shot) = self.shot.to_shot(hut_id) else {
                    return Task::none();
                };
                if self.pending {
                    return Task::none();
                }
                self.pending = true;
                let sighting = self.sighting.to_session(hut_id);
                let client = client.clone();
                return Task::perform(
                    async move {
                        if let Some(sighting) = sighting {
                            if let Err(error) = client.report(&sighting).await {
                                warn!(%error, "Zichtwaarneming niet opgeslagen");
                            }
                        }
                        client.create_shot(&shot).await
                    },
                    move |result| Message::ShotSaved(hut_id, result),
                );
            }
            Message::Reported(id, _) | Message::ShotSaved(id, _) if id != hut_id => {}
            Message::Reported(_, result) => {
                self.pending = false;
                if result.is_ok() && self.step == Some(Step::Sighting) {
                    self.close();
                }
            }
            Message::ShotSaved(_, result) => {
                self.pending = false;
                if result.is_ok() {
                    self.close();
                }
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let cancel = || {
            button("Annuleren")
                .on_press(Message::Cancel)
                .style(button::secondary)
        };
        let submit = |label: &'static str, message: Message| {
            button(label).on_press_maybe((!self.pending).then_some(message))
        };

        let content: Element<'_, Message> = match self.step {
            None => text("").into(),
            Some(Step::Choice) => column![
                text("Rapportage").size(20),
                text("Heb je wild gezien?"),
                row![
                    horizontal_space(),
                    cancel(),
                    button("Niet gezien").on_press(Message::NotSeen),
                    button("Wel gezien").on_press(Message::Seen),
                ]
                .spacing(8),
            ]
            .spacing(12)
            .into(),
            Some(Step::Sighting) => {
                let form = &self.sighting;
                column![
                    text("Zichtwaarneming").size(20),
                    sighting_input("Soort", &form.soort, SightingField::Soort),
                    sighting_input("Aantal", &form.aantal, SightingField::Aantal),
                    row![
                        sighting_input("Mannetjes", &form.mannetjes, SightingField::Mannetjes),
                        sighting_input("Vrouwtjes", &form.vrouwtjes, SightingField::Vrouwtjes),
                        sighting_input("Jonkies", &form.jonkies, SightingField::Jonkies),
                    ]
                    .spacing(6),
                    sighting_input("Tijd", &form.tijd, SightingField::Tijd),
                    row![
                        horizontal_space(),
                        cancel(),
                        submit("Opslaan", Message::SaveSighting),
                        button("Schot toevoegen").on_press(Message::ContinueToShot),
                    ]
                    .spacing(8),
                ]
                .spacing(8)
                .into()
            }
            Some(Step::Shot) => {
                let form = &self.shot;
                column![
                    text("Schot registreren").size(20),
                    shot_input("Soort", &form.soort, ShotField::Soort),
                    shot_input("Geslacht", &form.geslacht, ShotField::Geslacht),
                    row![
                        shot_input("Gewicht (kg)", &form.gewicht, ShotField::Gewicht),
                        shot_input("Leeftijd (jr)", &form.leeftijd, ShotField::Leeftijd),
                    ]
                    .spacing(6),
                    shot_input("Notities", &form.notities, ShotField::Notities),
                    shot_input("Tijdstip", &form.shot_at, ShotField::Tijd),
                ]
                .push_maybe(
                    (!form.time_is_valid())
                        .then(|| text("Tijdstip als jjjj-mm-ddTuu:mm").style(text::danger)),
                )
                .push(
                    row![
                        horizontal_space(),
                        button("Terug")
                            .on_press(Message::BackToSighting)
                            .style(button::secondary),
                        cancel(),
                        submit("Opslaan", Message::SubmitShot),
                    ]
                    .spacing(8),
                )
                .spacing(8)
                .into()
            }
        };

        card(content)
    }
}

fn sighting_input<'a>(label: &'a str, value: &'a str, field: SightingField) -> TextInput<'a, Message> {
    text_input(label, value).on_input(move |value| Message::Sighting(field, value))
}

fn shot_input<'a>(label: &'a str, value: &'a str, field: ShotField) -> TextInput<'a, Message> {
    text_input(label, value).on_input(move |value| Message::Shot(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Arc<Client> {
        Arc::new(Client::new(
            &crate::config::Config::default(),
            reqwest::Client::new(),
        ))
    }

    #[test]
    fn sighting_without_species_is_not_sent() {
        let form = SightingForm {
            aantal: "3".into(),
            ..SightingForm::default()
        };
        assert_eq!(form.to_session(1), None);
    }

    #[test]
    fn sighting_counts_default_to_zero() {
        let form = SightingForm {
            soort: " ree ".into(),
            aantal: "3".into(),
            mannetjes: "1".into(),
            vrouwtjes: "twee".into(),
            jonkies: String::new(),
            tijd: "2024-05-01T06:30".into(),
        };
        assert_eq!(
            form.to_session(7),
            Some(SightingSession::Seen {
                hut_id: 7,
                soort: "ree".into(),
                aantal: 3,
                mannetjes: 1,
                vrouwtjes: 0,
                jonkies: 0,
                tijd: "2024-05-01T06:30".into(),
            })
        );
    }

    #[test]
    fn shot_optional_fields() {
        let form = ShotForm {
            soort: "wild zwijn".into(),
            geslacht: String::new(),
            gewicht: "42,5".into(),
            leeftijd: "x".into(),
            notities: "  ".into(),
            shot_at: "2024-05-01T06:30".into(),
        };
        let shot = form.to_shot(4).unwrap();
        assert_eq!(shot.geslacht, None);
        assert_eq!(shot.gewicht_kg, Some(42.5));
        assert_eq!(shot.leeftijd_jr, None);
        assert_eq!(shot.notities, None);
        assert_eq!(ShotForm::default().to_shot(4), None);

        let late = ShotForm {
            shot_at: "gisteren".into(),
            ..form
        };
        assert!(!late.time_is_valid());
        assert_eq!(late.to_shot(4), None);
    }

    #[test]
    fn flow_steps() {
        let client = client();
        let mut report = Report::default();
        assert!(!report.is_open());

        report.open(3);
        assert_eq!(report.step, Some(Step::Choice));
        let _ = report.update(Message::Seen, &client);
        assert_eq!(report.step, Some(Step::Sighting));
        let _ = report.update(Message::Sighting(SightingField::Soort, "ree".into()), &client);
        let _ = report.update(Message::ContinueToShot, &client);
        assert_eq!(report.step, Some(Step::Shot));
        assert!(clock::is_valid_input(&report.shot.shot_at));
        let _ = report.update(Message::BackToSighting, &client);
        assert_eq!(report.sighting.soort, "ree");

        let _ = report.update(Message::ShotSaved(3, Ok(())), &client);
        assert!(!report.is_open());
    }

    #[test]
    fn back_keeps_typed_shot() {
        let client = client();
        let mut report = Report::default();
        report.open(3);
        let _ = report.update(Message::Seen, &client);
        let _ = report.update(Message::ContinueToShot, &client);
        let _ = report.update(Message::Shot(ShotField::Soort, "ree".into()), &client);
        let _ = report.update(Message::Shot(ShotField::Gewicht, "18".into()), &client);
        let _ = report.update(Message::BackToSighting, &client);
        let _ = report.update(Message::ContinueToShot, &client);

        assert_eq!(report.shot.soort, "ree");
        assert_eq!(report.shot.gewicht, "18");
        assert!(report.shot.time_is_valid());
    }

    #[test]
    fn answer_for_another_hut_is_ignored() {
        let client = client();
        let mut report = Report::default();
        report.open(3);
        let _ = report.update(Message::NotSeen, &client);
        report.open(4);
        let _ = report.update(Message::Seen, &client);

        let _ = report.update(Message::Reported(3, Ok(())), &client);
        assert!(report.is_open());
        let _ = report.update(Message::ShotSaved(3, Ok(())), &client);
        assert!(report.is_open());
        let _ = report.update(Message::Reported(4, Ok(())), &client);
        assert!(!report.is_open());
    }

    #[test]
    fn not_seen_closes_immediately() {
        let client = client();
        let mut report = Report::default();
        report.open(3);
        let _ = report.update(Message::NotSeen, &client);
        assert!(!report.is_open());
    }
}
