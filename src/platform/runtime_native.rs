use std::future::Future;
use std::time::Duration;

use super::Elapsed;

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

pub async fn timeout<F: Future>(duration: Duration, fut: F) -> Result<F::Output, Elapsed> {
    tokio::time::timeout(duration, fut).await.map_err(|_| Elapsed)
}

/// Run a detached task on the current tokio runtime.
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(fut);
}

/// Initialise `env_logger` with `level` as the default filter; `RUST_LOG`
/// still overrides it. Safe to call more than once.
pub fn init_logging(level: log::Level) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_ascii_lowercase()),
    )
    .try_init();
}
