use models::{
    auth::AuthStatus,
    conditions::{SensorState, Weather},
    config::ConfigSnapshot,
    view::SessionView,
};

/// What the client currently shows and the last snapshots it received.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    view: SessionView,
    config: Option<ConfigSnapshot>,
    state: Option<SensorState>,
    weather: Option<Weather>,
    config_version: u64,
}

/// Everything the dashboard needs before it can render.
#[derive(Copy, Clone, Debug)]
pub struct Dashboard<'a> {
    pub config: &'a ConfigSnapshot,
    pub state: &'a SensorState,
    pub weather: &'a Weather,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionView {
        self.view
    }

    pub fn config(&self) -> Option<&ConfigSnapshot> {
        self.config.as_ref()
    }

    pub fn state(&self) -> Option<&SensorState> {
        self.state.as_ref()
    }

    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }

    /// Bumped every time a config snapshot is applied.
    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    /// `None` until config, state and weather have all arrived.
    pub fn dashboard(&self) -> Option<Dashboard<'_>> {
        Some(Dashboard {
            config: self.config.as_ref()?,
            state: self.state.as_ref()?,
            weather: self.weather.as_ref()?,
        })
    }

    fn enter(&mut self, view: SessionView) -> SessionView {
        if self.view != view {
            tracing::debug!(from = %self.view, to = %view, "changing view");
        }
        self.view = view;
        view
    }

    /// Answer to the session probe made on mount.
    pub fn mounted(&mut self, status: AuthStatus) -> SessionView {
        self.enter(SessionView::after_mount(status))
    }

    /// Toolbar navigation. Returns the view entered, or `None` if the move
    /// isn't allowed from the current view.
    pub fn navigate(&mut self, to: SessionView) -> Option<SessionView> {
        match self.view.navigate(to) {
            Some(view) => Some(self.enter(view)),
            None => {
                tracing::debug!(from = %self.view, to = %to, "ignoring navigation");
                None
            }
        }
    }

    pub fn logged_in(&mut self) -> SessionView {
        self.enter(SessionView::Dashboard)
    }

    /// Drops every snapshot and goes back to the login form.
    pub fn logged_out(&mut self) -> SessionView {
        self.config = None;
        self.state = None;
        self.weather = None;
        self.enter(SessionView::Login)
    }

    /// Replaces the config snapshot and returns its version.
    pub fn replace_config(&mut self, config: ConfigSnapshot) -> u64 {
        self.config = Some(config);
        self.config_version += 1;
        self.config_version
    }

    pub fn replace_state(&mut self, state: SensorState) {
        self.state = Some(state);
    }

    pub fn replace_weather(&mut self, weather: Weather) {
        self.weather = Some(weather);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::conditions::{Condition, Conditions, Forecast, Solar};

    fn weather() -> Weather {
        Weather {
            temp_c: 3.0,
            relative_humidity: 80.0,
            condition: Condition {
                icon_url: "//cdn/rain.png".into(),
                description: "Light rain".into(),
            },
            forecast: Forecast { high: 5.0, low: -1.0 },
            solar: Solar {
                sunrise: 712,
                sunset: 1745,
            },
        }
    }

    fn state() -> SensorState {
        SensorState {
            conditions: Conditions {
                temp_c: 20.5,
                relative_humidity: 41.0,
            },
            status: Some("Idle".into()),
            daemon_running: Some(true),
        }
    }

    #[test]
    fn dashboard_needs_all_three_snapshots() {
        let mut store = SessionStore::new();
        store.mounted(AuthStatus::Authenticated);
        assert!(store.dashboard().is_none());

        store.replace_config(ConfigSnapshot::default());
        store.replace_weather(weather());
        assert!(store.dashboard().is_none());

        store.replace_state(state());
        let dashboard = store.dashboard().unwrap();
        assert_eq!(dashboard.state.conditions.temp_c, 20.5);
    }

    #[test]
    fn navigation_is_ignored_before_login() {
        let mut store = SessionStore::new();
        assert_eq!(store.navigate(SessionView::Config), None);
        assert_eq!(store.view(), SessionView::Loading);

        store.mounted(AuthStatus::AuthRequired);
        assert_eq!(store.view(), SessionView::Login);
        assert_eq!(store.navigate(SessionView::Dashboard), None);

        store.logged_in();
        assert_eq!(store.navigate(SessionView::Config), Some(SessionView::Config));
        assert_eq!(store.view(), SessionView::Config);
    }

    #[test]
    fn logout_clears_snapshots() {
        let mut store = SessionStore::new();
        store.mounted(AuthStatus::Authenticated);
        assert_eq!(store.replace_config(ConfigSnapshot::default()), 1);
        assert_eq!(store.replace_config(ConfigSnapshot::default()), 2);
        store.replace_state(state());

        assert_eq!(store.logged_out(), SessionView::Login);
        assert!(store.config().is_none());
        assert!(store.state().is_none());
        assert_eq!(store.config_version(), 2);
    }
}
