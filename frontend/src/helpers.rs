use anyhow::{anyhow, bail};
use models::{
    auth::{AuthStatus, LoginReply},
    conditions::{SensorState, Weather},
    config::{ConfigPatch, ConfigSnapshot},
    sync::{classify_success, classify_success_or_auth_required, Route, StatusClass},
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

/// Session cookies ride along: the backend is same-origin.
fn post(route: Route) -> RequestBuilder {
    let base = gloo_utils::window().origin();
    reqwest::Client::new().post(format!("{base}/{}", route.path()))
}

async fn payload<T: DeserializeOwned>(route: Route, request: RequestBuilder) -> anyhow::Result<T> {
    let response = request.send().await?;
    if let Err(status) = classify_success(response.status().as_u16()) {
        bail!("{route} answered {status}");
    }

    let mut json: Value = serde_json::from_slice(&response.bytes().await?)?;
    let value = match route.field() {
        Some(field) => json
            .get_mut(field)
            .map(Value::take)
            .filter(|value| !value.is_null())
            .ok_or_else(|| anyhow!("{route} reply has no `{field}`"))?,
        None => json,
    };
    Ok(serde_json::from_value(value)?)
}

pub async fn check_session() -> anyhow::Result<AuthStatus> {
    let response = post(Route::GetConfig).send().await?;
    match classify_success_or_auth_required(response.status().as_u16()) {
        Ok(StatusClass::Success) => Ok(AuthStatus::Authenticated),
        Ok(StatusClass::AuthRequired) => Ok(AuthStatus::AuthRequired),
        Err(status) => bail!("{} answered {status}", Route::GetConfig),
    }
}

pub async fn get_config() -> anyhow::Result<ConfigSnapshot> {
    payload(Route::GetConfig, post(Route::GetConfig)).await
}

pub async fn get_state() -> anyhow::Result<SensorState> {
    payload(Route::GetState, post(Route::GetState)).await
}

pub async fn get_weather() -> anyhow::Result<Weather> {
    payload(Route::GetWeather, post(Route::GetWeather)).await
}

pub async fn post_config(patch: &ConfigPatch) -> anyhow::Result<ConfigSnapshot> {
    payload(Route::SetConfig, post(Route::SetConfig).json(patch)).await
}

pub async fn login(username: &str, password: &str) -> anyhow::Result<LoginReply> {
    let form = [("username", username), ("password", password)];
    payload(Route::Login, post(Route::Login).form(&form)).await
}

pub async fn logout() -> anyhow::Result<LoginReply> {
    payload(Route::Logout, post(Route::Logout)).await
}
