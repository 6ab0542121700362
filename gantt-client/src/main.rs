//! # Gantt CLI
//!
//! Prints a viewer's tasks as a Gantt chart and a task table.
//!
//! ## Usage
//!
//! ```bash
//! # list accounts
//! cargo run -p gantt-client
//!
//! # chart the team's work by month
//! GANTT_USER="João Victor" GANTT_VIEW=team GANTT_ZOOM=month cargo run -p gantt-client
//! ```
//!
//! When the server is unreachable the last cached task list is shown and
//! marked as stale.

use gantt_client::{
    api::{HttpTaskApi, TaskApi},
    cache::FileCache,
    config::ClientConfig,
    controller::{ClientStateController, Freshness},
    timeline::{build_rows, format_date, render_chart, render_table},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gantt_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;

    let mut api = HttpTaskApi::with_timeout(&config.api_url, config.timeout())?;
    if let Some(token) = &config.token {
        api = api.with_token(token.clone());
    }

    let Some(user) = config.user.clone() else {
        let users = api.list_users().await?;
        println!("Users:");
        for name in users {
            println!("  {}", name);
        }
        println!("\nSet GANTT_USER to one of these names to see their tasks.");
        return Ok(());
    };

    let mut controller = ClientStateController::new(
        Arc::new(api),
        Arc::new(FileCache::new(&config.cache_path)),
        user,
        config.view,
    );

    match controller.load().await {
        Freshness::Fresh { .. } => {
            tracing::debug!(count = controller.tasks().len(), "Tasks loaded")
        }
        Freshness::Stale { saved_at } => {
            println!("(offline, tasks as of {})\n", format_date(saved_at.date_naive()))
        }
        Freshness::Unavailable | Freshness::NotLoaded => {}
    }
    for notice in controller.take_notices() {
        eprintln!("[{:?}] {}", notice.level, notice.message);
    }

    let rows = build_rows(&controller.visible_tasks());
    println!("{}", render_chart(&rows, config.zoom));
    print!("{}", render_table(&rows, config.view));

    Ok(())
}
