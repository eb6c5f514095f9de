use models::sync::Route;
use warp::{reject::Reject, Rejection};

/// Why a single backend request ended without a usable answer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("request to {route} could not complete: {source}")]
    Network {
        route: Route,
        #[source]
        source: reqwest::Error,
    },

    #[error("{route} answered {status} {text}")]
    HttpStatus {
        route: Route,
        status: u16,
        text: String,
    },

    #[error("{route} reply could not be decoded: {reason}")]
    Decode { route: Route, reason: String },

    /// A 403 reached a request that does not accept one.
    #[error("{route} requires a logged-in session")]
    AuthRequired { route: Route },
}

impl SyncError {
    pub fn route(&self) -> Route {
        match self {
            SyncError::Network { route, .. }
            | SyncError::HttpStatus { route, .. }
            | SyncError::Decode { route, .. }
            | SyncError::AuthRequired { route } => *route,
        }
    }

    pub(crate) fn decode(route: Route, reason: impl ToString) -> SyncError {
        SyncError::Decode {
            route,
            reason: reason.to_string(),
        }
    }
}

#[cfg(feature = "routes")]
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("no characteristic named {0:?}")]
    UnknownCharacteristic(String),

    #[error("{0} is read-only")]
    ReadOnly(crate::bridge::Characteristic),

    #[error("{characteristic} cannot be set to {value}")]
    InvalidValue {
        characteristic: crate::bridge::Characteristic,
        value: serde_json::Value,
    },

    #[error("mode {0} has no backend mapping")]
    UnmappedMode(models::heating_cooling::HeatingCooling),

    #[error("backend call to {path} failed: {source}")]
    Backend {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend reply to {path} has no usable value")]
    MissingValue { path: String },
}

#[cfg(feature = "routes")]
impl BridgeError {
    pub fn status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            BridgeError::UnknownCharacteristic(_) => StatusCode::NOT_FOUND,
            BridgeError::ReadOnly(_) => StatusCode::METHOD_NOT_ALLOWED,
            BridgeError::InvalidValue { .. } | BridgeError::UnmappedMode(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::Backend { .. } | BridgeError::MissingValue { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

pub trait WebErrorExt {
    type Out;
    fn reject_err(self) -> Self::Out;
}

impl<T, E: Into<anyhow::Error>> WebErrorExt for Result<T, E> {
    type Out = Result<T, Rejection>;
    fn reject_err(self) -> Self::Out {
        self.map_err(|e| warp::reject::custom(ServerError(e.into())))
    }
}

#[derive(Debug)]
pub struct ServerError(pub anyhow::Error);

impl Reject for ServerError {}
