//! Backend routes and how their HTTP status codes are read.

use std::fmt;

/// POST routes of the Nido web backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    GetConfig,
    GetState,
    GetWeather,
    SetConfig,
    Login,
    Logout,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::GetConfig => "get_config",
            Route::GetState => "get_state",
            Route::GetWeather => "get_weather",
            Route::SetConfig => "set_config",
            Route::Login => "login",
            Route::Logout => "logout",
        }
    }

    /// Key under which the route's payload sits in the reply body.
    pub fn field(self) -> Option<&'static str> {
        match self {
            Route::GetConfig | Route::SetConfig => Some("config"),
            Route::GetState => Some("state"),
            Route::GetWeather => Some("weather"),
            Route::Login | Route::Logout => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub const FORBIDDEN: u16 = 403;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    AuthRequired,
}

/// Success iff `status` is in `[200, 300)`.
pub fn classify_success(status: u16) -> Result<StatusClass, u16> {
    if (200..300).contains(&status) {
        Ok(StatusClass::Success)
    } else {
        Err(status)
    }
}

/// Like [`classify_success`], but a 403 is an expected answer meaning the
/// session is not logged in.
pub fn classify_success_or_auth_required(status: u16) -> Result<StatusClass, u16> {
    if status == FORBIDDEN {
        Ok(StatusClass::AuthRequired)
    } else {
        classify_success(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_classification_rejects_403() {
        assert_eq!(classify_success(200), Ok(StatusClass::Success));
        assert_eq!(classify_success(204), Ok(StatusClass::Success));
        assert_eq!(classify_success(299), Ok(StatusClass::Success));
        assert_eq!(classify_success(300), Err(300));
        assert_eq!(classify_success(403), Err(403));
        assert_eq!(classify_success(199), Err(199));
    }

    #[test]
    fn auth_classification_widens_success() {
        assert_eq!(classify_success_or_auth_required(403), Ok(StatusClass::AuthRequired));
        assert_eq!(classify_success_or_auth_required(201), Ok(StatusClass::Success));
        assert_eq!(classify_success_or_auth_required(401), Err(401));
        assert_eq!(classify_success_or_auth_required(500), Err(500));
    }

    #[test]
    fn routes_know_their_payload_field() {
        assert_eq!(Route::SetConfig.path(), "set_config");
        assert_eq!(Route::SetConfig.field(), Some("config"));
        assert_eq!(Route::GetWeather.field(), Some("weather"));
        assert_eq!(Route::Login.field(), None);
    }
}
