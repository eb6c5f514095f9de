use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use models::heating_cooling::HeatingCooling;
use nido::bridge::{self, BridgeClient, BridgeConfig};
use serde_json::{json, Value};
use warp::{http::StatusCode, reply, Filter, Reply};

type Calls = Arc<Mutex<Vec<String>>>;

/// Fake secret-protected thermostat API, recording every path it serves.
fn spawn_api(calls: Calls) -> SocketAddr {
    let api = warp::post()
        .and(warp::path("api_local"))
        .and(warp::path::tail())
        .and(warp::body::json())
        .map(move |tail: warp::path::Tail, body: Value| {
            calls.lock().unwrap().push(tail.as_str().to_string());
            if body["secret"] != "s3cret" {
                return reply::with_status(
                    reply::json(&json!({"error": "Invalid secret."})),
                    StatusCode::FORBIDDEN,
                )
                .into_response();
            }
            let reply = match tail.as_str() {
                "get/state" => json!({"state": {"value": 1, "name": "Heating"}}),
                "get/mode" => json!({"mode": {"value": 1, "name": "Heat"}}),
                "get/conditions" => json!({"conditions": {
                    "temp": {"celsius": 20.4, "fahrenheit": 68.72},
                    "pressure_mb": 1013.2,
                    "relative_humidity": 38.5
                }}),
                "get/temp/target" => json!({"temp": {"celsius": 21.5, "fahrenheit": 70.7}}),
                "get/temp/display_units" => json!({"celsius": true}),
                path if path.starts_with("set/") => json!({"message": "Updated successfully."}),
                _ => return StatusCode::NOT_FOUND.into_response(),
            };
            reply::json(&reply).into_response()
        });

    let (addr, server) = warp::serve(api).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn config(addr: SocketAddr, secret: &str) -> BridgeConfig {
    BridgeConfig {
        api_base: format!("http://{addr}/api_local/"),
        secret: secret.into(),
        port: 0,
        mode_mapping: BTreeMap::from([
            (HeatingCooling::Off, "Off".to_string()),
            (HeatingCooling::Heat, "Heat".to_string()),
            (HeatingCooling::Cool, "Cool".to_string()),
        ]),
        valid_modes: vec![HeatingCooling::Off, HeatingCooling::Heat],
    }
}

fn setup(secret: &str) -> (Calls, Arc<BridgeClient>) {
    let calls = Calls::default();
    let addr = spawn_api(calls.clone());
    let client = BridgeClient::new(config(addr, secret)).unwrap();
    (calls, Arc::new(client))
}

fn body(resp: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

#[tokio::test]
async fn reads_characteristics() {
    let (_, client) = setup("s3cret");
    let routes = bridge::routes(client);

    for (name, value) in [
        ("CurrentHeatingCoolingState", json!(1)),
        ("TargetHeatingCoolingState", json!(1)),
        ("CurrentTemperature", json!(20.4)),
        ("TargetTemperature", json!(21.5)),
        ("TemperatureDisplayUnits", json!(0)),
        ("CurrentRelativeHumidity", json!(38.5)),
    ] {
        let resp = warp::test::request()
            .method("GET")
            .path(&format!("/characteristics/{name}"))
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "{name}");
        assert_eq!(body(&resp), json!({ "value": value }), "{name}");
    }
}

#[tokio::test]
async fn writes_characteristics() {
    let (calls, client) = setup("s3cret");
    let routes = bridge::routes(client);

    for (name, value) in [
        ("TargetHeatingCoolingState", json!(1)),
        ("TargetTemperature", json!(22.5)),
        ("TemperatureDisplayUnits", json!(1)),
    ] {
        let resp = warp::test::request()
            .method("PUT")
            .path(&format!("/characteristics/{name}"))
            .json(&json!({ "value": value }))
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "{name}");
    }

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "set/mode/Heat",
            "set/temp/target/22.5/C",
            "set/temp/display_units/F"
        ]
    );
}

#[tokio::test]
async fn rejects_bad_requests() {
    let (calls, client) = setup("s3cret");
    let routes = bridge::routes(client);

    let resp = warp::test::request()
        .method("GET")
        .path("/characteristics/TargetRelativeHumidity")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = warp::test::request()
        .method("PUT")
        .path("/characteristics/CurrentTemperature")
        .json(&json!({"value": 30}))
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = warp::test::request()
        .method("PUT")
        .path("/characteristics/TargetHeatingCoolingState")
        .json(&json!({"value": 2}))
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body(&resp)["error"].as_str().unwrap().contains("Cool"));

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn backend_failure_is_bad_gateway() {
    let (calls, client) = setup("wrong");
    let routes = bridge::routes(client);

    let resp = warp::test::request()
        .method("GET")
        .path("/characteristics/TargetTemperature")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(*calls.lock().unwrap(), vec!["get/temp/target"]);
}
