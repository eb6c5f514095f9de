//! Client for the Nido web backend.
//!
//! All routes are credentialed POSTs; the session cookie set by `login` is
//! kept in the client's cookie store. Each call is a single attempt: the
//! caller logs a failure and carries on with what it already has.

use async_trait::async_trait;
use models::{
    auth::{AuthStatus, LoginReply},
    conditions::{SensorState, Weather},
    config::{ConfigPatch, ConfigReply, ConfigSnapshot},
    sync::{self as policy, Route, StatusClass},
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SyncError;

/// The backend operations the client depends on.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Probes `get_config`, reading a 403 as "not logged in".
    async fn check_session(&self) -> Result<AuthStatus, SyncError>;
    async fn get_config(&self) -> Result<ConfigSnapshot, SyncError>;
    async fn get_state(&self) -> Result<SensorState, SyncError>;
    async fn get_weather(&self) -> Result<Weather, SyncError>;
    /// Writes `patch` and returns the configuration the server now holds.
    async fn post_config(&self, patch: &ConfigPatch) -> Result<ConfigSnapshot, SyncError>;
    async fn login(&self, username: &str, password: &str) -> Result<LoginReply, SyncError>;
    async fn logout(&self) -> Result<LoginReply, SyncError>;
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: String,
}

/// A response that passed [`classify_success_or_auth_required`].
#[derive(Debug)]
pub enum Classified {
    Success(Response),
    AuthRequired,
}

impl HttpBackend {
    /// `base` is the origin the web app is served from, e.g. `http://nido.local/`.
    pub fn new(base: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().cookie_store(true).build()?;
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(HttpBackend { client, base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, route: Route) -> String {
        format!("{}{}", self.base, route.path())
    }

    /// Issues an empty POST to `route`.
    pub async fn fetch_route(&self, route: Route) -> Result<Response, SyncError> {
        self.client
            .post(self.url(route))
            .send()
            .await
            .map_err(|source| SyncError::Network { route, source })
    }

    async fn fetch_payload<T: DeserializeOwned>(&self, route: Route) -> Result<T, SyncError> {
        let response = classify_success(route, self.fetch_route(route).await?)?;
        let json = parse_json(route, response).await?;
        extract(route, json)
    }
}

fn status_error(route: Route, response: &Response) -> SyncError {
    let status = response.status();
    if status.as_u16() == policy::FORBIDDEN {
        return SyncError::AuthRequired { route };
    }
    SyncError::HttpStatus {
        route,
        status: status.as_u16(),
        text: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

/// Passes 2xx responses through, turns anything else into an error.
pub fn classify_success(route: Route, response: Response) -> Result<Response, SyncError> {
    match policy::classify_success(response.status().as_u16()) {
        Ok(_) => Ok(response),
        Err(_) => Err(status_error(route, &response)),
    }
}

/// Like [`classify_success`], but a 403 is a valid answer of its own.
pub fn classify_success_or_auth_required(
    route: Route,
    response: Response,
) -> Result<Classified, SyncError> {
    match policy::classify_success_or_auth_required(response.status().as_u16()) {
        Ok(StatusClass::Success) => Ok(Classified::Success(response)),
        Ok(StatusClass::AuthRequired) => Ok(Classified::AuthRequired),
        Err(_) => Err(status_error(route, &response)),
    }
}

pub async fn parse_json(route: Route, response: Response) -> Result<Value, SyncError> {
    let body = response
        .bytes()
        .await
        .map_err(|source| SyncError::Network { route, source })?;
    serde_json::from_slice(&body).map_err(|e| SyncError::decode(route, e))
}

/// Pulls the route's payload field out of a reply body.
fn extract<T: DeserializeOwned>(route: Route, mut json: Value) -> Result<T, SyncError> {
    let value = match route.field() {
        Some(field) => match json.get_mut(field).map(Value::take) {
            Some(Value::Null) | None => {
                return Err(SyncError::decode(route, format!("reply has no `{field}`")))
            }
            Some(value) => value,
        },
        None => json,
    };
    serde_json::from_value(value).map_err(|e| SyncError::decode(route, e))
}

fn config_from_reply(route: Route, json: Value) -> Result<ConfigSnapshot, SyncError> {
    let reply: ConfigReply = serde_json::from_value(json).map_err(|e| SyncError::decode(route, e))?;
    if let Some(error) = &reply.error {
        tracing::debug!(%route, %error, "backend reported an error");
    }
    if let Some(message) = &reply.message {
        tracing::debug!(%route, %message, "backend message");
    }
    match reply.config {
        Some(config) => Ok(config),
        None if reply.config_required => Err(SyncError::decode(route, "backend needs configuring")),
        None => Err(SyncError::decode(route, "reply has no `config`")),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn check_session(&self) -> Result<AuthStatus, SyncError> {
        let route = Route::GetConfig;
        match classify_success_or_auth_required(route, self.fetch_route(route).await?)? {
            Classified::AuthRequired => Ok(AuthStatus::AuthRequired),
            Classified::Success(_) => Ok(AuthStatus::Authenticated),
        }
    }

    async fn get_config(&self) -> Result<ConfigSnapshot, SyncError> {
        let route = Route::GetConfig;
        let response = classify_success(route, self.fetch_route(route).await?)?;
        config_from_reply(route, parse_json(route, response).await?)
    }

    async fn get_state(&self) -> Result<SensorState, SyncError> {
        self.fetch_payload(Route::GetState).await
    }

    async fn get_weather(&self) -> Result<Weather, SyncError> {
        let route = Route::GetWeather;
        let response = classify_success(route, self.fetch_route(route).await?)?;
        let json = parse_json(route, response).await?;
        // Seconds since the backend last asked its weather provider; -1 if never
        if let Some(age) = json.get("retrieval_age").and_then(Value::as_i64) {
            tracing::debug!(age, "weather retrieval age");
        }
        extract(route, json)
    }

    async fn post_config(&self, patch: &ConfigPatch) -> Result<ConfigSnapshot, SyncError> {
        let route = Route::SetConfig;
        let response = self
            .client
            .post(self.url(route))
            .json(patch)
            .send()
            .await
            .map_err(|source| SyncError::Network { route, source })?;
        let response = classify_success(route, response)?;
        config_from_reply(route, parse_json(route, response).await?)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginReply, SyncError> {
        let route = Route::Login;
        let response = self
            .client
            .post(self.url(route))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|source| SyncError::Network { route, source })?;
        let response = classify_success(route, response)?;
        extract(route, parse_json(route, response).await?)
    }

    async fn logout(&self) -> Result<LoginReply, SyncError> {
        self.fetch_payload(Route::Logout).await
    }
}
