use std::future::Future;

pub use app::{Action, ClientOptions, Event, Nido};
pub use error::SyncError;
pub use session::{Dashboard, SessionStore};
pub use sync::{Backend, HttpBackend};

pub mod app;
#[cfg(feature = "routes")]
pub mod bridge;
pub mod error;
pub mod session;
pub mod sync;

#[cfg(feature = "routes")]
pub async fn run_bridge() -> anyhow::Result<()> {
    let config = bridge::BridgeConfig::from_env()?;
    bridge::run(config).await
}

#[cfg(tokio_unstable)]
#[track_caller]
fn spawn(name: &str, future: impl Future<Output = impl Send + 'static> + Send + 'static) {
    if let Err(err) = tokio::task::Builder::new().name(name).spawn(future) {
        tracing::error!(name, %err, "failed to spawn task");
    }
}
#[cfg(not(tokio_unstable))]
#[track_caller]
fn spawn(_name: &str, future: impl Future<Output = impl Send + 'static> + Send + 'static) {
    tokio::spawn(future);
}
