//! Smart-home accessory bridge.
//!
//! Serves `GET`/`PUT /characteristics/<name>` and forwards each call to the
//! backend's secret-protected API.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use warp::{filters::BoxedFilter, reply, Filter, Rejection, Reply};

use crate::error::{BridgeError, ServerError, WebErrorExt};

mod characteristic;
mod config;

pub use characteristic::Characteristic;
pub use config::BridgeConfig;

/// Talks to the backend on behalf of the accessory.
#[derive(Clone, Debug)]
pub struct BridgeClient {
    client: reqwest::Client,
    config: Arc<BridgeConfig>,
}

impl BridgeClient {
    pub fn new(config: BridgeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(BridgeClient {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    async fn call(&self, path: &str) -> Result<Value, BridgeError> {
        let url = format!("{}{}", self.config.api_base, path);
        tracing::debug!(%url, "calling backend");
        let backend = |source| BridgeError::Backend {
            path: path.to_string(),
            source,
        };
        self.client
            .post(&url)
            .json(&json!({ "secret": self.config.secret }))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(backend)?
            .json::<Value>()
            .await
            .map_err(backend)
    }

    pub async fn read(&self, characteristic: Characteristic) -> Result<Value, BridgeError> {
        let path = characteristic.read_path();
        let reply = self.call(path).await?;
        characteristic
            .read_value(&reply)
            .ok_or_else(|| BridgeError::MissingValue {
                path: path.to_string(),
            })
    }

    pub async fn write(
        &self,
        characteristic: Characteristic,
        value: &Value,
    ) -> Result<(), BridgeError> {
        if !characteristic.is_writable() {
            return Err(BridgeError::ReadOnly(characteristic));
        }
        let path = characteristic.write_path(value, &self.config)?;
        self.call(&path).await?;
        tracing::info!(%characteristic, %value, "characteristic updated");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CharacteristicWrite {
    value: Value,
}

pub fn routes(client: Arc<BridgeClient>) -> BoxedFilter<(impl Reply,)> {
    let with_client = warp::any().map(move || client.clone());

    let get = warp::get()
        .and(warp::path!("characteristics" / String))
        .and(with_client.clone())
        .and_then(|name: String, client: Arc<BridgeClient>| async move {
            let characteristic = name.parse::<Characteristic>().reject_err()?;
            let value = client.read(characteristic).await.reject_err()?;
            Ok::<_, Rejection>(reply::json(&json!({ "value": value })))
        });

    let put = warp::put()
        .and(warp::path!("characteristics" / String))
        .and(warp::body::json())
        .and(with_client)
        .and_then(
            |name: String, body: CharacteristicWrite, client: Arc<BridgeClient>| async move {
                let characteristic = name.parse::<Characteristic>().reject_err()?;
                client.write(characteristic, &body.value).await.reject_err()?;
                Ok::<_, Rejection>(reply::json(&json!({ "value": body.value })))
            },
        );

    get.or(put)
        .recover(|rejection: Rejection| async move {
            if let Some(ServerError(err)) = rejection.find::<ServerError>() {
                let status = err
                    .downcast_ref::<BridgeError>()
                    .map_or(http::StatusCode::INTERNAL_SERVER_ERROR, BridgeError::status);
                tracing::warn!(%status, error = %err, "bridge request failed");
                let mut resp = reply::json(&json!({ "error": err.to_string() })).into_response();
                *resp.status_mut() = status;
                Ok(resp)
            } else {
                Err(rejection)
            }
        })
        .boxed()
}

pub async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    let port = config.port;
    let client = Arc::new(BridgeClient::new(config)?);
    tracing::info!(port, api_base = %client.config().api_base, "bridge listening");
    warp::serve(routes(client)).run(([0, 0, 0, 0], port)).await;
    Ok(())
}
