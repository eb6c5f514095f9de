//! The native client.
//!
//! [`Nido`] owns the session store and the config editor. A single task feeds
//! it user [`Action`]s and polls [`Nido::next_event`], which waits on request
//! completions, the debounce timer and the periodic refresh, and applies
//! whichever comes first. Nothing else touches the state.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use futures_util::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use models::{
    auth::{AuthStatus, LoginReply},
    conditions::{SensorState, Weather},
    config::{ConfigPatch, ConfigSnapshot},
    editor::{ConfigEditor, Ticket, Write},
    sync::Route,
    view::SessionView,
    DEBOUNCE_WINDOW, REFRESH_INTERVAL,
};
use tokio::{
    sync::mpsc,
    time::{self, Instant, Interval, MissedTickBehavior, Sleep},
};

use crate::{
    error::SyncError,
    session::SessionStore,
    sync::{Backend, HttpBackend},
};

#[derive(Copy, Clone, Debug)]
pub struct ClientOptions {
    /// Quiet period after the last edit before it is written back.
    pub debounce: Duration,
    /// Dashboard refresh period.
    pub refresh_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            debounce: DEBOUNCE_WINDOW,
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

/// Something the user did.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Navigate(SessionView),
    Login { username: String, password: String },
    Logout,
    ToggleUnit,
    /// `true` raises the setpoint one step, `false` lowers it.
    ChangeSetpoint(bool),
    CycleMode,
    SaveModes(Vec<(String, bool)>),
}

/// What [`Nido::next_event`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ViewChanged(SessionView),
    /// A config snapshot was applied; carries its version.
    ConfigApplied(u64),
    StateApplied,
    WeatherApplied,
    WriteSent,
    LoginRejected,
    Failed(Route),
    Refreshing,
    Idle,
}

enum Completion {
    Mount(Result<AuthStatus, SyncError>),
    Config(Result<ConfigSnapshot, SyncError>),
    State(Result<SensorState, SyncError>),
    Weather(Result<Weather, SyncError>),
    Written {
        version: u64,
        result: Result<ConfigSnapshot, SyncError>,
    },
    Login(Result<LoginReply, SyncError>),
    Logout(Result<LoginReply, SyncError>),
}

pub struct Nido<B> {
    backend: Arc<B>,
    session: SessionStore,
    editor: ConfigEditor,
    debounce_window: Duration,
    debounce: Option<(Ticket, Pin<Box<Sleep>>)>,
    refresh: Interval,
    inflight: FuturesUnordered<BoxFuture<'static, Completion>>,
    login_feedback: Option<String>,
}

impl Nido<HttpBackend> {
    pub fn connect(base: impl Into<String>, options: ClientOptions) -> Result<Self, reqwest::Error> {
        Ok(Nido::new(HttpBackend::new(base)?, options))
    }
}

impl<B: Backend> Nido<B> {
    /// Must be called from within a tokio runtime.
    pub fn new(backend: B, options: ClientOptions) -> Self {
        let mut refresh = time::interval_at(
            Instant::now() + options.refresh_interval,
            options.refresh_interval,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Nido {
            backend: Arc::new(backend),
            session: SessionStore::new(),
            editor: ConfigEditor::new(),
            debounce_window: options.debounce,
            debounce: None,
            refresh,
            inflight: FuturesUnordered::new(),
            login_feedback: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn editor(&self) -> &ConfigEditor {
        &self.editor
    }

    /// Text from the last rejected login, for showing under the form.
    pub fn login_feedback(&self) -> Option<&str> {
        self.login_feedback.as_deref()
    }

    pub fn has_inflight(&self) -> bool {
        !self.inflight.is_empty()
    }

    fn request<F>(&mut self, request: impl FnOnce(Arc<B>) -> F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.inflight.push(request(Arc::clone(&self.backend)).boxed());
    }

    /// Probes the session to decide between the login form and the dashboard.
    pub fn mount(&mut self) {
        self.request(|backend| async move { Completion::Mount(backend.check_session().await) });
    }

    fn refresh(&mut self) {
        tracing::debug!("refreshing config, state and weather");
        self.request(|backend| async move { Completion::Config(backend.get_config().await) });
        self.request(|backend| async move { Completion::State(backend.get_state().await) });
        self.request(|backend| async move { Completion::Weather(backend.get_weather().await) });
    }

    fn entered(&mut self, view: SessionView) {
        if view.refreshes_on_entry() {
            self.refresh.reset();
            self.refresh();
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Navigate(to) => {
                if let Some(view) = self.session.navigate(to) {
                    self.entered(view);
                }
            }
            Action::Login { username, password } => {
                if self.session.view() != SessionView::Login {
                    tracing::debug!(view = %self.session.view(), "ignoring login outside the login form");
                    return;
                }
                self.request(move |backend| async move {
                    Completion::Login(backend.login(&username, &password).await)
                });
            }
            Action::Logout => {
                self.request(|backend| async move { Completion::Logout(backend.logout().await) });
            }
            Action::ToggleUnit => {
                let ticket = self.editor.toggle_unit();
                self.schedule(ticket);
            }
            Action::ChangeSetpoint(increment) => {
                let ticket = self.editor.change_setpoint(increment);
                self.schedule(ticket);
            }
            Action::CycleMode => {
                let ticket = self.editor.cycle_mode();
                self.schedule(ticket);
            }
            Action::SaveModes(modes) => {
                self.post(ConfigPatch::modes_available(modes));
            }
        }
    }

    /// (Re)starts the quiet window for `ticket`.
    fn schedule(&mut self, ticket: Option<Ticket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let deadline = Instant::now() + self.debounce_window;
        match &mut self.debounce {
            Some((current, sleep)) => {
                *current = ticket;
                sleep.as_mut().reset(deadline);
            }
            None => self.debounce = Some((ticket, Box::pin(time::sleep_until(deadline)))),
        }
    }

    fn post(&mut self, patch: ConfigPatch) {
        let version = self.session.config_version();
        tracing::info!(?patch, version, "writing config");
        self.request(move |backend| async move {
            Completion::Written {
                version,
                result: backend.post_config(&patch).await,
            }
        });
    }

    fn send(&mut self, write: Write) {
        self.post(write.config.into());
    }

    /// Waits for the next completion or timer and applies it.
    ///
    /// Cancel safe: dropping the future before it resolves loses nothing.
    pub async fn next_event(&mut self) -> Event {
        tokio::select! {
            Some(done) = self.inflight.next(), if !self.inflight.is_empty() => self.complete(done),
            ticket = elapsed(&mut self.debounce) => self.fire(ticket),
            _ = self.refresh.tick() => self.tick(),
        }
    }

    fn fire(&mut self, ticket: Ticket) -> Event {
        self.debounce = None;
        match self.editor.fire(ticket) {
            Some(write) => {
                self.send(write);
                Event::WriteSent
            }
            None => {
                tracing::debug!("edits settled back to the server state");
                Event::Idle
            }
        }
    }

    fn tick(&mut self) -> Event {
        if self.session.view() != SessionView::Dashboard {
            return Event::Idle;
        }
        self.refresh();
        Event::Refreshing
    }

    fn apply_config(&mut self, config: ConfigSnapshot) -> Event {
        if self.editor.is_scheduled() {
            tracing::debug!("new snapshot replaces unsent edits");
        }
        self.editor.seed(&config);
        self.debounce = None;
        Event::ConfigApplied(self.session.replace_config(config))
    }

    fn complete(&mut self, done: Completion) -> Event {
        match done {
            Completion::Mount(Ok(status)) => {
                let view = self.session.mounted(status);
                self.entered(view);
                Event::ViewChanged(view)
            }
            Completion::Config(Ok(config)) => self.apply_config(config),
            Completion::State(Ok(state)) => {
                self.session.replace_state(state);
                Event::StateApplied
            }
            Completion::Weather(Ok(weather)) => {
                self.session.replace_weather(weather);
                Event::WeatherApplied
            }
            Completion::Written {
                version,
                result: Ok(config),
            } => {
                let current = self.session.config_version();
                if version != current {
                    tracing::info!(version, current, "write acknowledged after a newer snapshot");
                }
                self.apply_config(config)
            }
            Completion::Login(Ok(reply)) if reply.logged_in => {
                tracing::info!(username = ?reply.username, "logged in");
                self.login_feedback = None;
                let view = self.session.logged_in();
                self.entered(view);
                Event::ViewChanged(view)
            }
            Completion::Login(Ok(reply)) => {
                self.login_feedback = reply.feedback().map(str::to_owned);
                tracing::info!(feedback = ?self.login_feedback, "login rejected");
                Event::LoginRejected
            }
            Completion::Logout(Ok(_)) => {
                self.editor = ConfigEditor::new();
                self.debounce = None;
                Event::ViewChanged(self.session.logged_out())
            }
            Completion::Mount(Err(err))
            | Completion::Config(Err(err))
            | Completion::Written {
                result: Err(err), ..
            }
            | Completion::State(Err(err))
            | Completion::Weather(Err(err))
            | Completion::Login(Err(err))
            | Completion::Logout(Err(err)) => failed(err),
        }
    }

    /// Sends any edits still inside their quiet window and waits for every
    /// outstanding request to finish.
    pub async fn shutdown(mut self) -> SessionStore {
        self.debounce = None;
        if let Some(write) = self.editor.flush() {
            self.send(write);
        }
        while let Some(done) = self.inflight.next().await {
            self.complete(done);
        }
        self.session
    }

    /// Mounts and serves `actions` until the sending side goes away.
    pub async fn run(mut self, mut actions: mpsc::UnboundedReceiver<Action>) -> SessionStore {
        self.mount();
        loop {
            tokio::select! {
                action = actions.recv() => match action {
                    Some(action) => self.dispatch(action),
                    None => break,
                },
                event = self.next_event() => tracing::trace!(?event),
            }
        }
        self.shutdown().await
    }

    /// Runs the client on its own task and returns the handle for feeding it.
    pub fn spawn(self) -> mpsc::UnboundedSender<Action> {
        let (tx, rx) = mpsc::unbounded_channel();
        crate::spawn("nido-client", self.run(rx));
        tx
    }
}

async fn elapsed(debounce: &mut Option<(Ticket, Pin<Box<Sleep>>)>) -> Ticket {
    match debounce {
        Some((ticket, sleep)) => {
            sleep.as_mut().await;
            *ticket
        }
        None => std::future::pending().await,
    }
}

fn failed(err: SyncError) -> Event {
    tracing::warn!(route = %err.route(), error = %err, "request failed");
    Event::Failed(err.route())
}
