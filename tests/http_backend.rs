use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use models::{auth::AuthStatus, config::ConfigPatch, sync::Route};
use nido::{Backend, HttpBackend, SyncError};
use serde_json::{json, Value};
use warp::{http::StatusCode, reply, Filter, Reply};

fn forbidden() -> warp::reply::Response {
    reply::with_status(reply::json(&json!({"error": "Login required."})), StatusCode::FORBIDDEN)
        .into_response()
}

/// A stand-in for the web backend: session cookie auth, one config document.
fn spawn_backend() -> SocketAddr {
    let config = Arc::new(Mutex::new(json!({
        "celsius": true,
        "set_temperature": 21.0,
        "mode_set": "Heat",
        "modes": ["Off", "Heat", "Cool"],
    })));
    let session = || {
        warp::cookie::optional::<String>("session")
            .map(|session: Option<String>| session.as_deref() == Some("ok"))
    };

    let get_config = {
        let config = config.clone();
        warp::post()
            .and(warp::path!("get_config"))
            .and(session())
            .map(move |logged_in: bool| {
                if !logged_in {
                    return forbidden();
                }
                let config = config.lock().unwrap().clone();
                reply::json(&json!({ "config": config })).into_response()
            })
    };

    let set_config = warp::post()
        .and(warp::path!("set_config"))
        .and(session())
        .and(warp::body::json())
        .map(move |logged_in: bool, patch: Value| {
            if !logged_in {
                return forbidden();
            }
            let mut config = config.lock().unwrap();
            if let (Some(config), Some(patch)) = (config.as_object_mut(), patch.as_object()) {
                for (key, value) in patch {
                    config.insert(key.clone(), value.clone());
                }
            }
            reply::json(&json!({
                "config": *config,
                "message": "Configuration updated successfully.",
            }))
            .into_response()
        });

    let get_state = warp::post()
        .and(warp::path!("get_state"))
        .map(|| StatusCode::INTERNAL_SERVER_ERROR.into_response());

    let get_weather = warp::post()
        .and(warp::path!("get_weather"))
        .map(|| "<html>Bad Gateway</html>".into_response());

    let login = warp::post()
        .and(warp::path!("login"))
        .and(warp::body::form())
        .map(|form: HashMap<String, String>| {
            if form.get("password").map(String::as_str) == Some("hunter2") {
                reply::with_header(
                    reply::json(&json!({
                        "logged_in": true,
                        "username": form.get("username"),
                        "message": "User has been logged in.",
                    })),
                    "set-cookie",
                    "session=ok; Path=/",
                )
                .into_response()
            } else {
                reply::json(&json!({
                    "logged_in": false,
                    "error": "Incorrect login credentials.",
                }))
                .into_response()
            }
        });

    let routes = get_config
        .or(set_config)
        .unify()
        .or(get_state)
        .unify()
        .or(get_weather)
        .unify()
        .or(login)
        .unify();

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn backend(addr: SocketAddr) -> HttpBackend {
    HttpBackend::new(format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn session_probe_and_login() {
    let backend = backend(spawn_backend());

    assert_eq!(backend.check_session().await.unwrap(), AuthStatus::AuthRequired);

    let reply = backend.login("connie", "wrong").await.unwrap();
    assert!(!reply.logged_in);
    assert_eq!(reply.feedback(), Some("Incorrect login credentials."));

    let reply = backend.login("connie", "hunter2").await.unwrap();
    assert!(reply.logged_in);
    assert_eq!(reply.username.as_deref(), Some("connie"));

    assert_eq!(backend.check_session().await.unwrap(), AuthStatus::Authenticated);
    let config = backend.get_config().await.unwrap();
    assert_eq!(config.set_temperature, 21.0);
    assert_eq!(config.modes, vec!["Off", "Heat", "Cool"]);
}

#[tokio::test]
async fn forbidden_outside_the_probe_is_an_error() {
    let backend = backend(spawn_backend());
    let err = backend.get_config().await.unwrap_err();
    assert!(matches!(err, SyncError::AuthRequired { route: Route::GetConfig }));
}

#[tokio::test]
async fn post_config_returns_server_copy() {
    let backend = backend(spawn_backend());
    backend.login("connie", "hunter2").await.unwrap();

    let config = backend
        .post_config(&ConfigPatch {
            set_temperature: Some(22.5),
            mode_set: Some("Cool".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(config.set_temperature, 22.5);
    assert_eq!(config.mode_set, "Cool");
    assert!(config.celsius);

    let config = backend
        .post_config(&ConfigPatch::modes_available(vec![("Cool".into(), false)]))
        .await
        .unwrap();
    assert_eq!(config.modes_available, vec![("Cool".to_string(), false)]);
    assert_eq!(config.set_temperature, 22.5);
}

#[tokio::test]
async fn server_errors_are_classified() {
    let backend = backend(spawn_backend());

    let err = backend.get_state().await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::HttpStatus {
            route: Route::GetState,
            status: 500,
            ..
        }
    ));

    let err = backend.get_weather().await.unwrap_err();
    assert!(matches!(err, SyncError::Decode { route: Route::GetWeather, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let backend = HttpBackend::new("http://127.0.0.1:1/").unwrap();
    let err = backend.check_session().await.unwrap_err();
    assert!(matches!(err, SyncError::Network { route: Route::GetConfig, .. }));
}
