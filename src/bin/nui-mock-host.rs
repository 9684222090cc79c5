//! Mock game-server host for dev-mode work on the admin panel
//!
//! Serves canned `{ success, data }` responses for every panel endpoint so
//! the bridge can be exercised without a running game server.
//!
//! ## Usage
//! ```bash
//! cargo run --bin nui-mock-host --features mock-host
//! nuibridge --base-url http://127.0.0.1:3030 watch getPlayers --id-field id
//! ```

use anyhow::Context;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    nuibridge::platform::init_logging(log::Level::Info);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3030u16);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    nuibridge::mock_host::serve(addr)
        .await
        .context("mock host stopped")
}
