//! Which screen the client shows, and how it gets from one to the next.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::AuthStatus;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionView {
    #[default]
    Loading,
    Login,
    Dashboard,
    Config,
}

impl SessionView {
    pub fn name(self) -> &'static str {
        match self {
            SessionView::Loading => "loading",
            SessionView::Login => "login",
            SessionView::Dashboard => "dashboard",
            SessionView::Config => "config",
        }
    }

    /// View reached once the session probe made on mount has an answer.
    pub fn after_mount(status: AuthStatus) -> SessionView {
        match status {
            AuthStatus::AuthRequired => SessionView::Login,
            AuthStatus::Authenticated => SessionView::Dashboard,
        }
    }

    /// Target of an explicit toolbar navigation, or `None` when the move is
    /// not allowed from here.
    ///
    /// Only the dashboard and config screens are reachable this way, and only
    /// from a screen that already implies an authenticated session.
    pub fn navigate(self, to: SessionView) -> Option<SessionView> {
        match (self, to) {
            (
                SessionView::Dashboard | SessionView::Config,
                SessionView::Dashboard | SessionView::Config,
            ) => Some(to),
            _ => None,
        }
    }

    /// Whether entering this view starts a refresh of config, state and weather.
    pub fn refreshes_on_entry(self) -> bool {
        self == SessionView::Dashboard
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
