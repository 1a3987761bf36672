//! `crowdsource-module` -- load a module and report or change its state.
//!
//! Loads one module from the backend, applies any field edits given in
//! the environment through the debounced sync path, prints its publish
//! readiness, and optionally publishes it.
//!
//! Notices go to stderr, one per line. Every exit path closes the notice
//! bus and waits for them to be written.
//!
//! On exit the cached project draft in `CACHE_DIR` is read and written
//! back through the session teardown. The binary never edits the draft,
//! so this only rewrites it in canonical form (or creates a blank one).
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                      |
//! |------------------------|----------|-------------------------|----------------------------------|
//! | `MODULE_ID`            | yes      | --                      | Module to open                   |
//! | `PUBLISH`              | no       | `false`                 | Publish when ready               |
//! | `MODULE_NAME`          | no       | --                      | New module name                  |
//! | `MODULE_PRICE`         | no       | --                      | New task price                   |
//! | `MODULE_REPETITION`    | no       | --                      | New number of workers per task   |
//! | `CROWDSOURCE_API_URL`  | no       | `http://localhost:8000` | Backend base URL                 |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | HTTP timeout                     |
//! | `SYNC_DEBOUNCE_MS`     | no       | `2048`                  | Field update debounce            |
//! | `CACHE_DIR`            | no       | `.crowdsource-cache`    | Local draft cache                |

use std::sync::Arc;
use std::time::Duration;

use crowdsource_client::config::{parse_optional_var, parse_var, required_var};
use crowdsource_client::{ConfigError, CrowdsourceApi};
use crowdsource_core::cache::FileCache;
use crowdsource_core::project::ProjectDraft;
use crowdsource_core::types::DbId;
use crowdsource_sync::config::SyncConfig;
use crowdsource_sync::notice::relay;
use crowdsource_sync::session::{readiness_summary, ModuleSession};
use crowdsource_sync::{NoticeBus, SessionError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Edits requested through the environment.
struct Edits {
    name: Option<String>,
    price: Option<f64>,
    repetition: Option<i64>,
    publish: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdsource_sync=info,crowdsource_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = exit_on_error(SyncConfig::from_env());
    let module_id: DbId = exit_on_error(required_var("MODULE_ID", "integer"));
    let edits = Edits {
        name: std::env::var("MODULE_NAME").ok(),
        price: exit_on_error(parse_optional_var("MODULE_PRICE", "number")),
        repetition: exit_on_error(parse_optional_var("MODULE_REPETITION", "integer")),
        publish: exit_on_error(parse_var("PUBLISH", "bool", false)),
    };

    tracing::info!(
        module_id,
        api_url = %config.client.api_url,
        debounce_ms = config.debounce_ms,
        "Starting crowdsource-module",
    );

    let api = CrowdsourceApi::from_config(&config.client).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    let notices = Arc::new(NoticeBus::default());
    let printer = tokio::spawn(relay(notices.subscribe(), std::io::stderr()));

    let result = run(
        Arc::new(api),
        Arc::clone(&notices),
        module_id,
        config.debounce(),
        edits,
        FileCache::new(config.cache_dir.clone()),
    )
    .await;

    // Last sender; the printer drains and stops once it is gone.
    drop(notices);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Notice printer failed");
    }

    if let Err(e) = result {
        tracing::error!(module_id, error = %e, "crowdsource-module failed");
        std::process::exit(1);
    }
}

async fn run(
    api: Arc<CrowdsourceApi>,
    notices: Arc<NoticeBus>,
    module_id: DbId,
    debounce: Duration,
    edits: Edits,
    cache: FileCache,
) -> Result<(), SessionError> {
    let mut session = ModuleSession::load(api, notices, module_id, debounce).await?;

    session.edit(|module| {
        if let Some(name) = edits.name {
            module.name = name;
        }
        if let Some(price) = edits.price {
            module.price = Some(price);
        }
        if let Some(repetition) = edits.repetition {
            module.repetition = Some(repetition);
        }
    });
    session.flush().await;

    if edits.publish && session.publish().await.is_err() {
        tracing::warn!(module_id, "Module was not published");
    }

    println!("{}", readiness_summary(session.module()));

    let draft = ProjectDraft::load(&cache).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable project draft");
        ProjectDraft::blank()
    });
    session.teardown(&cache, &draft)
}

/// Unwrap a parsed variable or exit with the parse error logged.
fn exit_on_error<T>(value: Result<T, ConfigError>) -> T {
    value.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    })
}
