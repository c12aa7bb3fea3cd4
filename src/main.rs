//! TabbiMate - language-exchange video-chat prototype
//!
//! A terminal rendition of the TabbiMate mock: pick a language and a
//! practice level, get matched from a hardcoded directory, and run a
//! simulated call with timers, chat stubs and favorites. Everything is
//! local; there is no real matching service, media transport or chat
//! backend.

mod chat;
mod directory;
mod matching;
mod runtime;
mod state_machine;
mod store;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use store::{KvStore, ProfileStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::TuiApp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration
    let data_dir = std::env::var("TABBIMATE_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.tabbimate")
    });
    std::fs::create_dir_all(&data_dir)?;

    let db_path = std::env::var("TABBIMATE_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(&data_dir).join("tabbimate.db"));

    // The terminal belongs to the UI, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(PathBuf::from(&data_dir).join("tabbimate.log"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabbimate=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Arc::new(log_file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    tracing::info!(path = %db_path.display(), "Opening store");
    let kv = KvStore::open(&db_path)?;

    let handle = runtime::launch(kv.clone());
    let profile_store = ProfileStore::new(kv);

    let mut app = TuiApp::new(handle, profile_store);
    app.run().await?;

    Ok(())
}
