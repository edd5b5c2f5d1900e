use crate::{
    client::Client,
    session::Session,
    utils::{Error, Result},
};
use iced::{
    widget::{button, column, row, text, text_input},
    Alignment, Element, Length, Task,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Login,
    Register,
}

#[derive(Debug, Clone)]
pub enum Message {
    Toggle,
    Switch(Form),
    Username(String),
    Password(String),
    Code(String),
    Submit,
    Done(Form, Result<Session>),
    Logout,
}

#[derive(Debug)]
pub struct Login {
    open: bool,
    pending: bool,
    form: Form,
    username: String,
    password: String,
    code: String,
}

impl Default for Login {
    fn default() -> Self {
        Self {
            open: false,
            pending: false,
            form: Form::Login,
            username: String::new(),
            password: String::new(),
            code: String::new(),
        }
    }
}

impl Login {
    pub fn update(&mut self, message: Message, client: &Arc<Client>) -> Task<Message> {
        match message {
            Message::Toggle => self.open = !self.open,
            Message::Switch(form) => self.form = form,
            Message::Username(username) => self.username = username,
            Message::Password(password) => self.password = password,
            Message::Code(code) => self.code = code,
            Message::Submit => {
                if self.pending || self.username.trim().is_empty() {
                    return Task::none();
                }
                self.pending = true;

                let client = client.clone();
                let form = self.form;
                let username = self.username.trim().to_owned();
                let password = self.password.clone();
                let code = self.code.clone();
                return Task::perform(
                    async move {
                        let token = match form {
                            Form::Login => client.login(&username, &password).await,
                            Form::Register => client.register(&username, &password, &code).await,
                        }?;
                        Ok::<_, Error>(Session::new(token, username))
                    },
                    move |result| Message::Done(form, result),
                );
            }
            Message::Done(_, result) => {
                self.pending = false;
                if result.is_ok() {
                    self.open = false;
                    self.password.clear();
                    self.code.clear();
                }
            }
            Message::Logout => {}
        }
        Task::none()
    }

    pub fn view(&self, session: Option<&Session>) -> Element<'_, Message> {
        if let Some(session) = session {
            return row![
                text(session.username.clone()),
                button("Uitloggen")
                    .on_press(Message::Logout)
                    .style(button::secondary),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into();
        }

        let toggle = button("Inloggen").on_press(Message::Toggle);
        if !self.open {
            return toggle.into();
        }

        let submit = |label: &'static str| {
            button(label).on_press_maybe((!self.pending).then_some(Message::Submit))
        };

        let form: Element<'_, Message> = match self.form {
            Form::Login => column![
                text_input("gebruikersnaam", &self.username).on_input(Message::Username),
                text_input("wachtwoord", &self.password)
                    .secure(true)
                    .on_input(Message::Password)
                    .on_submit(Message::Submit),
                submit("Inloggen"),
                button("Registreren")
                    .on_press(Message::Switch(Form::Register))
                    .style(button::text),
            ]
            .spacing(6)
            .into(),
            Form::Register => column![
                text_input("gebruikersnaam", &self.username).on_input(Message::Username),
                text_input("wachtwoord", &self.password)
                    .secure(true)
                    .on_input(Message::Password),
                text_input("registratiecode", &self.code)
                    .on_input(Message::Code)
                    .on_submit(Message::Submit),
                submit("Registreren"),
                button("Terug naar inloggen")
                    .on_press(Message::Switch(Form::Login))
                    .style(button::text),
            ]
            .spacing(6)
            .into(),
        };

        column![toggle, form]
            .spacing(8)
            .width(Length::Fixed(220.0))
            .into()
    }
}
