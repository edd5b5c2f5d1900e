//! Stand-ins for the browser's `prompt()` and `confirm()` dialogs.

use super::card;
use crate::model::LatLng;
use iced::{
    widget::{button, column, horizontal_space, row, text, text_input},
    Element,
};

/// Why the dialog is open; decides what happens with the answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Purpose {
    NewHut(LatLng),
    EditHut(i64),
    DeleteHut(i64),
    ZoneLabel,
    DeleteZone(i64),
    DeleteShot { hut_id: i64, shot_id: i64 },
}

#[derive(Debug, Clone)]
pub enum Message {
    Input(usize, String),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    label: &'static str,
    value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub purpose: Purpose,
    title: String,
    fields: Vec<Field>,
}

impl Prompt {
    pub fn ask(purpose: Purpose, title: impl Into<String>) -> Self {
        Self {
            purpose,
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// A `confirm()`: no fields, just yes or no.
    pub fn confirm(purpose: Purpose, question: impl Into<String>) -> Self {
        Self::ask(purpose, question)
    }

    #[must_use]
    pub fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            label,
            value: value.into(),
        });
        self
    }

    /// Trimmed answer of field `index`, empty if there is no such field.
    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map_or("", |field| field.value.trim())
    }

    pub fn update(&mut self, message: Message) {
        if let Message::Input(index, value) = message {
            if let Some(field) = self.fields.get_mut(index) {
                field.value = value;
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fields = self.fields.iter().enumerate().map(|(index, field)| {
            column![
                text(field.label).size(14),
                text_input(field.label, &field.value)
                    .on_input(move |value| Message::Input(index, value))
                    .on_submit(Message::Submit),
            ]
            .spacing(4)
            .into()
        });

        let (yes, no) = if self.fields.is_empty() {
            ("Ja", "Nee")
        } else {
            ("OK", "Annuleren")
        };

        card(
            column![
                text(&self.title).size(18),
                column(fields).spacing(8),
                row![
                    horizontal_space(),
                    button(no).on_press(Message::Cancel).style(button::secondary),
                    button(yes).on_press(Message::Submit),
                ]
                .spacing(8),
            ]
            .spacing(12),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_trimmed() {
        let mut prompt = Prompt::ask(Purpose::EditHut(1), "Hut bewerken")
            .field("Nieuwe naam", "Eik")
            .field("Nieuwe beschrijving", "");
        prompt.update(Message::Input(1, "  bij de beek ".into()));
        prompt.update(Message::Input(7, "ignored".into()));
        assert_eq!(prompt.value(0), "Eik");
        assert_eq!(prompt.value(1), "bij de beek");
        assert_eq!(prompt.value(2), "");
    }

    #[test]
    fn confirm_has_no_fields() {
        let prompt = Prompt::confirm(Purpose::DeleteHut(3), "Verwijder Eik 3?");
        assert_eq!(prompt.value(0), "");
        assert_eq!(prompt.purpose, Purpose::DeleteHut(3));
    }
}
