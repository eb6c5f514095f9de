use serde::{Deserialize, Serialize};

/// Result of probing the session with `get_config`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    AuthRequired,
}

/// Reply of `login` and `logout`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LoginReply {
    /// Text worth showing next to the login form, if any.
    pub fn feedback(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}
