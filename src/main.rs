#![deny(clippy::all, clippy::nursery, clippy::perf, clippy::pedantic)]
#![allow(
    clippy::items_after_statements,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::too_many_lines
)]

mod client;
mod config;
mod map;
mod model;
mod session;
mod utils;
mod views;
mod wind;

use crate::{
    client::Client,
    config::Config,
    map::{Camera, HutMode, MapAction, MapState, ZoneShape},
    model::{Hut, NewHut, WindRecord, Zone, ZoneType},
    session::{Session, SessionStore},
    views::{
        hut, leaderboard, login, map as canvas, modal,
        prompt::{self, Purpose},
        report, HutPopup, Leaderboard, Log, Login, MapView, Prompt, Report,
    },
    wind::WindField,
};
use iced::{
    widget::{button, checkbox, column, container, horizontal_space, row, stack, text},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use std::{io, process, sync::Arc};
use tap::Pipe;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use utils::{Error, Result};

const SESSION_EXPIRED: &str = "Je sessie is verlopen – log opnieuw in.";
const UNSAVED_ZONE: &str = "Deze zone is nog niet opgeslagen.";

pub fn main() -> iced::Result {
    let loaded = Config::load();
    let level = loaded
        .as_ref()
        .map_or_else(|_| "info".to_owned(), |config| config.log_level.clone());

    let (non_blocking, guard) = tracing_appender::non_blocking(io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(non_blocking)
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(error) => {
            error!(%error);
            drop(guard);
            process::exit(1);
        }
    };

    iced::application(App::title, App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window_size((1280.0, 800.0))
        .antialiasing(true)
        .run_with(move || App::new(config))
}

#[derive(Debug, Clone)]
enum Message {
    Connected(bool),
    Loaded(Result<(Vec<Hut>, Vec<Zone>)>),
    ZonesReloaded(Result<Vec<Zone>>),
    WindLoaded(Result<Option<Vec<WindRecord>>>),
    RefreshWind,

    ToggleMenu,
    ToggleWind(bool),
    Recenter,
    ClearLog,

    HutMode(HutMode),
    ToggleZoneTypes,
    StartZone(ZoneType),
    ConfirmZone,
    CancelZone,
    AskDeleteZone,

    HutSaved(Result<Hut>),
    HutDeleted(i64, Result<()>),
    ZoneCreated(u64, Result<i64>),
    ZoneUpdated(Result<()>),
    ZoneDeleted(i64, Result<()>),

    Map(canvas::Message),
    Login(login::Message),
    Hut(hut::Message),
    Report(report::Message),
    Leaderboard(leaderboard::Message),
    Prompt(prompt::Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Connecting,
    Loading,
    Ready,
}

struct App {
    config: Config,
    store: SessionStore,
    session: Option<Session>,
    client: Arc<Client>,

    state: State,
    camera: Camera,
    map: MapState,
    wind: Option<WindField>,
    show_wind: bool,
    menu: bool,

    login: Login,
    hut: HutPopup,
    report: Report,
    leaderboard: Leaderboard,
    prompt: Option<Prompt>,
    log: Log,
}

impl App {
    fn new(config: Config) -> (Self, Task<Message>) {
        let store = SessionStore::new(config.session_path());
        debug!(path = %store.path().display(), "session store");
        let session = store.restore();
        let client = Client::new(&config, reqwest::Client::new())
            .authorized(session.as_ref().map(|session| session.token.clone()))
            .pipe(Arc::new);

        let connect = {
            let client = client.clone();
            Task::perform(
                async move { client.test_connection().await },
                Message::Connected,
            )
        };

        (
            Self {
                camera: Camera::new(&config.map),
                config,
                store,
                session,
                client,
                state: State::Connecting,
                map: MapState::default(),
                wind: None,
                show_wind: false,
                menu: false,
                login: Login::default(),
                hut: HutPopup::default(),
                report: Report::default(),
                leaderboard: Leaderboard::default(),
                prompt: None,
                log: Log::default(),
            },
            connect,
        )
    }

    fn title(&self) -> String {
        match self.state {
            State::Connecting => "Verbinden",
            State::Loading => "Laden",
            State::Ready => "Kaart",
        }
        .pipe(|state| format!("Hutjeskaart - {state}"))
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.state == State::Ready {
            iced::time::every(self.config.wind_refresh()).map(|_| Message::RefreshWind)
        } else {
            Subscription::none()
        }
    }

    fn logged_in(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_valid)
    }

    fn exit_edit_modes(&mut self) {
        self.map.exit_edit_modes();
        self.report.close();
        self.menu = false;
    }

    fn logout(&mut self) {
        self.session = None;
        self.client = Arc::new(self.client.authorized(None));
        self.exit_edit_modes();
    }

    fn expire(&mut self) {
        self.store.clear_or_warn();
        self.log.warn(SESSION_EXPIRED);
        self.logout();
    }

    /// Reports a failed call; an expired session logs the user out.
    fn failed(&mut self, error: &Error, what: &str) {
        if error.is_unauthorized() {
            self.expire();
        } else {
            self.log.error(format!("{what}: {}", error.detail()));
        }
    }

    fn perform<T, F>(
        &self,
        call: impl FnOnce(Arc<Client>) -> F,
        message: impl Fn(T) -> Message + Send + 'static,
    ) -> Task<Message>
    where
        T: Send + 'static,
        F: std::future::Future<Output = T> + Send + 'static,
    {
        Task::perform(call(self.client.clone()), message)
    }

    fn load_wind(&self) -> Task<Message> {
        self.perform(
            |client| async move { client.latest_wind().await },
            Message::WindLoaded,
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Connected(connected) => {
                if !connected {
                    self.log.warn("Geen verbinding met de server.");
                }
                self.state = State::Loading;
                return self.perform(
                    |client| async move {
                        futures::try_join!(client.huts(), client.zones())
                    },
                    Message::Loaded,
                );
            }
            Message::Loaded(result) => {
                match result {
                    Ok((huts, zones)) => {
                        info!(huts = huts.len(), zones = zones.len(), "map loaded");
                        self.map.replace_huts(huts);
                        self.map.replace_zones(zones);
                    }
                    Err(error) => self.failed(&error, "Laden van de kaart mislukt"),
                }
                self.state = State::Ready;
                return self.load_wind();
            }
            Message::ZonesReloaded(result) => match result {
                Ok(zones) => self.map.replace_zones(zones),
                Err(error) => self.failed(&error, "Laden van zones mislukt"),
            },
            Message::RefreshWind => return self.load_wind(),
            Message::WindLoaded(result) => match result {
                Ok(Some(records)) => match WindField::from_records(records) {
                    Ok(field) => self.wind = Some(field),
                    Err(error) => warn!(%error, "unusable wind data"),
                },
                Ok(None) => debug!("no wind data available"),
                Err(error) => warn!(%error, "wind request failed"),
            },

            Message::ToggleMenu => {
                if self.menu {
                    self.exit_edit_modes();
                } else {
                    self.menu = true;
                }
            }
            Message::ToggleWind(show) => self.show_wind = show,
            Message::Recenter => self.camera.center_on(self.config.map.start),
            Message::ClearLog => self.log.clear(),

            Message::HutMode(mode) => {
                let mode = (self.map.hut_mode() != Some(mode)).then_some(mode);
                if let Err(action) = self.map.set_hut_mode(mode, self.logged_in()) {
                    return self.map_action(action);
                }
            }
            Message::ToggleZoneTypes => {
                if self.logged_in() {
                    self.map.deselect_zone();
                    self.map.drawing.toggle_types();
                } else {
                    return self.map_action(MapAction::LoginRequired);
                }
            }
            Message::StartZone(kind) => self.map.drawing.start(kind),
            Message::ConfirmZone => match self.map.drawing.kind() {
                Some(kind) if !self.map.drawing.can_confirm() => {
                    let needed = kind.min_vertices();
                    self.log.warn(format!("Teken minimaal {needed} punten."));
                }
                Some(_) => {
                    self.prompt = Some(
                        Prompt::ask(Purpose::ZoneLabel, "Zone opslaan").field("Label (optioneel)", ""),
                    );
                }
                None => {}
            },
            Message::CancelZone => self.map.drawing.cancel(),
            Message::AskDeleteZone => {
                if let Some(zone) = self.map.selected_zone() {
                    match zone.id {
                        Some(id) => {
                            let question = format!("Zone {} verwijderen?", zone.title());
                            self.prompt = Some(Prompt::confirm(Purpose::DeleteZone(id), question));
                        }
                        None => self.log.warn(UNSAVED_ZONE),
                    }
                }
            }

            Message::HutSaved(result) => match result {
                Ok(hut) => {
                    self.log.info(format!("Hutje {} opgeslagen.", hut.title()));
                    self.map.upsert_hut(hut);
                }
                Err(error) => self.failed(&error, "Opslaan van hutje mislukt"),
            },
            Message::HutDeleted(id, result) => match result {
                Ok(()) => {
                    self.map.remove_hut(id);
                    if self.hut.hut_id() == Some(id) {
                        self.hut.close();
                        self.report.close();
                    }
                    self.log.info("Hutje verwijderd.");
                }
                Err(error) => self.failed(&error, "Verwijderen van hutje mislukt"),
            },
            Message::ZoneCreated(key, result) => match result {
                Ok(id) => {
                    self.map.zone_saved(key, id);
                    self.map.drawing.cancel();
                    self.log.info("Zone opgeslagen.");
                }
                Err(error) => {
                    self.map.discard_draft(key);
                    self.failed(&error, "Opslaan van zone mislukt");
                }
            },
            Message::ZoneUpdated(result) => match result {
                Ok(()) => self.log.info("Zone bijgewerkt."),
                Err(error) => {
                    self.failed(&error, "Bijwerken van zone mislukt");
                    return self.perform(
                        |client| async move { client.zones().await },
                        Message::ZonesReloaded,
                    );
                }
            },
            Message::ZoneDeleted(id, result) => match result {
                Ok(()) => {
                    self.map.remove_zone(id);
                    self.log.info("Zone verwijderd.");
                }
                Err(error) => self.failed(&error, "Verwijderen van zone mislukt"),
            },

            Message::Map(message) => return self.on_map(message),
            Message::Login(message) => return self.on_login(message),
            Message::Hut(message) => return self.on_hut(message),
            Message::Report(message) => return self.on_report(message),
            Message::Leaderboard(message) => {
                let expired = matches!(
                    &message,
                    leaderboard::Message::Loaded(Err(error)) if error.is_unauthorized()
                );
                if expired {
                    self.expire();
                }
                return self
                    .leaderboard
                    .update(message, &self.client)
                    .map(Message::Leaderboard);
            }
            Message::Prompt(prompt::Message::Submit) => {
                if let Some(prompt) = self.prompt.take() {
                    return self.answer(&prompt);
                }
            }
            Message::Prompt(prompt::Message::Cancel) => self.prompt = None,
            Message::Prompt(message) => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.update(message);
                }
            }
        }
        Task::none()
    }

    fn on_map(&mut self, message: canvas::Message) -> Task<Message> {
        match message {
            canvas::Message::Clicked(at) => {
                if let Some(action) = self.map.click_map(at, self.logged_in()) {
                    self.map.finish_add();
                    return self.map_action(action);
                }
            }
            canvas::Message::HutClicked(id) => {
                let action = self.map.click_hut(id, self.logged_in());
                return self.map_action(action);
            }
            canvas::Message::ZoneClicked(index) => self.map.click_zone(index),
            canvas::Message::VertexMoved { vertex, to } => {
                self.map.move_vertex(vertex, to);
            }
            canvas::Message::VertexReleased => {
                if let Some(shape) = self.map.selected_zone() {
                    let Some(id) = shape.id else {
                        self.log.warn(UNSAVED_ZONE);
                        return Task::none();
                    };
                    let zone = shape.to_new();
                    return self.perform(
                        move |client| async move { client.update_zone(id, &zone).await },
                        Message::ZoneUpdated,
                    );
                }
            }
            canvas::Message::Panned(delta) => self.camera.pan(delta),
            canvas::Message::Zoomed {
                steps,
                cursor,
                viewport,
            } => self.camera.zoom_at(steps, cursor, viewport),
        }
        Task::none()
    }

    fn map_action(&mut self, action: MapAction) -> Task<Message> {
        match action {
            MapAction::LoginRequired => self.log.warn("Log eerst in."),
            MapAction::NewHut(at) => {
                self.prompt = Some(
                    Prompt::ask(Purpose::NewHut(at), "Nieuw hutje")
                        .field("Naam", "")
                        .field("Nummer", "")
                        .field("Beschrijving", ""),
                );
            }
            MapAction::EditHut(id) => {
                if let Some(hut) = self.map.hut(id) {
                    self.prompt = Some(
                        Prompt::ask(Purpose::EditHut(id), format!("{} bewerken", hut.title()))
                            .field("Nieuwe naam", hut.name.clone())
                            .field("Nieuw nummer", hut.number.clone())
                            .field("Nieuwe beschrijving", hut.desc.clone()),
                    );
                }
            }
            MapAction::DeleteHut(id) => {
                if let Some(hut) = self.map.hut(id) {
                    let question = format!("Weet je zeker dat je {} wilt verwijderen?", hut.title());
                    self.prompt = Some(Prompt::confirm(Purpose::DeleteHut(id), question));
                }
            }
            MapAction::OpenHut(id) => {
                self.report.close();
                return self.hut.open(id, &self.client).map(Message::Hut);
            }
        }
        Task::none()
    }

    fn answer(&mut self, prompt: &Prompt) -> Task<Message> {
        match prompt.purpose {
            Purpose::NewHut(at) => {
                if prompt.value(0).is_empty() || prompt.value(1).is_empty() {
                    self.log.warn("Een hutje heeft een naam en een nummer nodig.");
                    return Task::none();
                }
                let hut = NewHut {
                    name: prompt.value(0).to_owned(),
                    number: prompt.value(1).to_owned(),
                    desc: prompt.value(2).to_owned(),
                    lat: at.lat,
                    lng: at.lng,
                };
                self.perform(
                    |client| async move {
                        let id = client.create_hut(&hut).await?;
                        Ok::<_, Error>(hut.into_hut(id))
                    },
                    Message::HutSaved,
                )
            }
            Purpose::EditHut(id) => {
                let Some(mut hut) = self.map.hut(id).cloned() else {
                    return Task::none();
                };
                if prompt.value(0).is_empty() {
                    self.log.warn("Bewerken afgebroken: geen naam opgegeven.");
                    return Task::none();
                }
                hut.name = prompt.value(0).to_owned();
                if !prompt.value(1).is_empty() {
                    hut.number = prompt.value(1).to_owned();
                }
                hut.desc = prompt.value(2).to_owned();
                self.perform(
                    |client| async move {
                        client.update_hut(&hut).await?;
                        Ok::<_, Error>(hut)
                    },
                    Message::HutSaved,
                )
            }
            Purpose::DeleteHut(id) => self.perform(
                move |client| async move { client.delete_hut(id).await },
                move |result| Message::HutDeleted(id, result),
            ),
            Purpose::ZoneLabel => {
                let Some((kind, latlngs)) = self.map.drawing.pending() else {
                    return Task::none();
                };
                let shape = ZoneShape::drawn(kind, prompt.value(0), latlngs);
                let zone = shape.to_new();
                let key = self.map.push_zone(shape);
                self.perform(
                    |client| async move { client.create_zone(&zone).await },
                    move |result| Message::ZoneCreated(key, result),
                )
            }
            Purpose::DeleteZone(id) => self.perform(
                move |client| async move { client.delete_zone(id).await },
                move |result| Message::ZoneDeleted(id, result),
            ),
            Purpose::DeleteShot { hut_id, shot_id } => {
                if self.hut.hut_id() != Some(hut_id) {
                    return Task::none();
                }
                self.hut
                    .update(hut::Message::DeleteShot(shot_id), &self.client)
                    .map(Message::Hut)
            }
        }
    }

    fn on_login(&mut self, message: login::Message) -> Task<Message> {
        match &message {
            login::Message::Done(form, Ok(session)) => {
                if let Err(error) = self.store.save(session) {
                    warn!(%error, "could not store session");
                }
                self.client = Arc::new(self.client.authorized(Some(session.token.clone())));
                self.session = Some(session.clone());
                self.log.info(match form {
                    login::Form::Login => format!("Ingelogd als {}.", session.username),
                    login::Form::Register => {
                        format!("Geregistreerd en ingelogd als {}.", session.username)
                    }
                });
            }
            login::Message::Done(form, Err(error)) => {
                let what = match form {
                    login::Form::Login => "Inloggen mislukt",
                    login::Form::Register => "Registratie mislukt",
                };
                self.log.error(format!("{what}: {}", error.detail()));
            }
            login::Message::Logout => {
                self.store.clear_or_warn();
                self.log.info("Uitgelogd.");
                self.logout();
            }
            _ => {}
        }
        self.login.update(message, &self.client).map(Message::Login)
    }

    fn on_hut(&mut self, message: hut::Message) -> Task<Message> {
        match &message {
            hut::Message::AskDeleteShot(shot_id) => {
                if let Some(hut_id) = self.hut.hut_id() {
                    self.prompt = Some(Prompt::confirm(
                        Purpose::DeleteShot {
                            hut_id,
                            shot_id: *shot_id,
                        },
                        "Weet je zeker dat je dit schot wilt verwijderen?",
                    ));
                }
            }
            hut::Message::ShotDeleted(Ok(())) => self.log.info("Schot verwijderd."),
            hut::Message::ShotDeleted(Err(error)) => {
                self.failed(error, "Verwijderen van schot mislukt");
            }
            hut::Message::Report(hut_id) => {
                if self.logged_in() {
                    self.report.open(*hut_id);
                } else {
                    return self.map_action(MapAction::LoginRequired);
                }
            }
            hut::Message::Close => self.report.close(),
            hut::Message::Loaded(_, Err(error)) if error.is_unauthorized() => self.expire(),
            hut::Message::Loaded(..) | hut::Message::DeleteShot(_) => {}
        }
        self.hut.update(message, &self.client).map(Message::Hut)
    }

    fn on_report(&mut self, message: report::Message) -> Task<Message> {
        let mut refresh = Task::none();
        match &message {
            report::Message::Reported(_, Ok(())) => self.log.info("Rapportage opgeslagen."),
            report::Message::Reported(_, Err(error)) => {
                self.failed(error, "Opslaan van rapportage mislukt");
            }
            report::Message::ShotSaved(hut_id, Ok(())) => {
                self.log.info("Schot en sighting opgeslagen!");
                if self.hut.hut_id() == Some(*hut_id) {
                    refresh = self.hut.open(*hut_id, &self.client).map(Message::Hut);
                }
            }
            report::Message::ShotSaved(_, Err(error)) => {
                self.failed(error, "Opslaan van schot mislukt");
            }
            _ => {}
        }
        let task = self.report.update(message, &self.client).map(Message::Report);
        Task::batch([task, refresh])
    }

    fn view(&self) -> Element<'_, Message> {
        let status = match self.state {
            State::Connecting => Some(text("Verbinden…")),
            State::Loading => Some(text("Laden…")),
            State::Ready => None,
        };

        let toolbar = row![text("Hutjeskaart").size(20)]
            .push_maybe(status)
            .push(horizontal_space())
            .push(checkbox("Wind", self.show_wind).on_toggle(Message::ToggleWind))
            .push(
                button("Startpositie")
                    .on_press(Message::Recenter)
                    .style(button::secondary),
            )
            .push(
                button("Leaderboard")
                    .on_press(Message::Leaderboard(leaderboard::Message::Open))
                    .style(button::secondary),
            )
            .push(
                button(if self.menu { "Menu sluiten" } else { "Bewerken" })
                    .on_press(Message::ToggleMenu),
            )
            .push(self.login.view(self.session.as_ref()).map(Message::Login))
            .spacing(10)
            .padding(8)
            .align_y(Alignment::Center);

        let map = MapView::new(
            &self.map,
            &self.camera,
            self.wind.as_ref(),
            &self.config.map.bounds,
            self.show_wind,
        )
        .view()
        .map(Message::Map);

        let popup = self
            .hut
            .hut_id()
            .and_then(|id| self.map.hut(id))
            .map(|hut| self.hut.view(hut, self.session.as_ref()).map(Message::Hut));

        let side = column![]
            .push_maybe(self.menu.then(|| self.menu_view()))
            .push_maybe(popup)
            .push_maybe((!self.log.is_empty()).then(|| self.log.view(Message::ClearLog)))
            .spacing(10)
            .padding(10);

        let page: Element<'_, Message> = column![
            toolbar,
            stack![map, side].width(Length::Fill).height(Length::Fill),
        ]
        .into();

        if let Some(prompt) = &self.prompt {
            modal(
                page,
                prompt.view().map(Message::Prompt),
                Message::Prompt(prompt::Message::Cancel),
            )
        } else if self.report.is_open() {
            modal(
                page,
                self.report.view().map(Message::Report),
                Message::Report(report::Message::Cancel),
            )
        } else if self.leaderboard.is_open() {
            modal(
                page,
                self.leaderboard.view().map(Message::Leaderboard),
                Message::Leaderboard(leaderboard::Message::Close),
            )
        } else {
            page
        }
    }

    fn menu_view(&self) -> Element<'_, Message> {
        let active = self.map.hut_mode();
        let modes = row(HutMode::ALL.into_iter().map(|mode| {
            button(text(mode.to_string()))
                .on_press(Message::HutMode(mode))
                .style(if active == Some(mode) {
                    button::primary
                } else {
                    button::secondary
                })
                .into()
        }))
        .spacing(6);

        let drawing = &self.map.drawing;
        let types = drawing.is_choosing().then(|| {
            row(ZoneType::PICKABLE.into_iter().map(|kind| {
                button(text(kind.to_string()))
                    .on_press(Message::StartZone(kind))
                    .style(button::secondary)
                    .into()
            }))
            .spacing(6)
        });
        let progress = drawing.kind().map(|kind| {
            row![
                text(format!("{kind}: {} punten", drawing.points().len())),
                horizontal_space(),
                button("Bevestigen").on_press_maybe(drawing.can_confirm().then_some(Message::ConfirmZone)),
                button("Annuleren")
                    .on_press(Message::CancelZone)
                    .style(button::secondary),
            ]
            .spacing(6)
            .align_y(Alignment::Center)
        });
        let selected = self.map.selected_zone().map(|zone| {
            row![
                text(zone.title()),
                horizontal_space(),
                button("Verwijder zone")
                    .on_press(Message::AskDeleteZone)
                    .style(button::danger),
            ]
            .spacing(6)
            .align_y(Alignment::Center)
        });

        container(
            column![
                text("Hutjes").size(16),
                modes,
                text("Zones").size(16),
                button("Zone tekenen").on_press(Message::ToggleZoneTypes),
            ]
            .push_maybe(types)
            .push_maybe(progress)
            .push_maybe(selected)
            .spacing(8),
        )
        .padding(12)
        .width(Length::Fixed(420.0))
        .style(container::rounded_box)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::tests::token_with_exp, utils::ApiError};
    use std::path::Path;

    fn app(dir: &Path) -> App {
        let config = Config {
            session_file: Some(dir.join("session.json")),
            ..Config::default()
        };
        App::new(config).0
    }

    fn jan() -> Session {
        Session::new(token_with_exp(4_102_444_800), "jan")
    }

    fn unauthorized() -> Error {
        Error::from(ApiError::Unauthorized)
    }

    fn logged_in_app(dir: &Path) -> App {
        SessionStore::new(dir.join("session.json")).save(&jan()).unwrap();
        let app = app(dir);
        assert_eq!(app.session, Some(jan()));
        app
    }

    fn assert_expired(app: &App) {
        assert_eq!(app.session, None);
        assert!(!app.logged_in());
        assert!(!app.store.path().exists());
        assert!(!app.log.is_empty());
    }

    #[test]
    fn login_stores_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert!(!app.logged_in());

        let _ = app.update(Message::Login(login::Message::Done(
            login::Form::Login,
            Ok(jan()),
        )));

        assert!(app.logged_in());
        assert_eq!(app.store.load().unwrap(), Some(jan()));
    }

    #[test]
    fn failed_login_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let _ = app.update(Message::Login(login::Message::Done(
            login::Form::Login,
            Err(unauthorized()),
        )));

        assert_eq!(app.session, None);
        assert_eq!(app.store.load().unwrap(), None);
    }

    #[test]
    fn shots_401_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(dir.path());
        app.map.set_hut_mode(Some(HutMode::Edit), true).unwrap();

        let _ = app.update(Message::Hut(hut::Message::Loaded(1, Err(unauthorized()))));

        assert_expired(&app);
        assert_eq!(app.map.hut_mode(), None);
    }

    #[test]
    fn leaderboard_401_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(dir.path());

        let _ = app.update(Message::Leaderboard(leaderboard::Message::Open));
        let _ = app.update(Message::Leaderboard(leaderboard::Message::Loaded(Err(
            unauthorized(),
        ))));

        assert_expired(&app);
        assert!(app.leaderboard.is_open());
    }

    #[test]
    fn other_failures_keep_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(dir.path());

        let _ = app.update(Message::Hut(hut::Message::Loaded(
            1,
            Err(crate::utils::error::anyio!("offline")),
        )));

        assert_eq!(app.session, Some(jan()));
        assert!(app.store.path().exists());
    }

    #[test]
    fn logout_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(dir.path());

        let _ = app.update(Message::Login(login::Message::Logout));

        assert_eq!(app.session, None);
        assert_eq!(app.store.load().unwrap(), None);
    }
}
