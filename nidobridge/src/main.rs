use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut last_restart = None::<Instant>;
    let mut pileon_fails = 0;
    loop {
        if let Err(err) = nido::run_bridge().await {
            tracing::error!("Error encountered: {err:#}");
        };

        if let Some(last_restart_time) = last_restart {
            let now = Instant::now();
            if (now - last_restart_time) < Duration::from_secs(60) {
                pileon_fails += 1;
                tokio::time::sleep(Duration::from_secs(pileon_fails * pileon_fails)).await;
            } else {
                pileon_fails = 0;
            }
        }

        last_restart = Some(Instant::now());
        tracing::warn!("Restarting nidobridge");
    }
}
