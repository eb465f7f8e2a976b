use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use slot_counter::client::{ConsoleSink, HttpStatusSource, Widget};
use slot_counter::config::{Cli, Command, ServeArgs, WatchArgs, log_filter};
use slot_counter::{MemoryStore, WidgetService, api};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Watch(args) => watch(args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let store = MemoryStore::with_records(args.seed());
    if !store.is_empty() {
        info!(widgets = store.len(), "seeded inventory");
    }

    let listener = TcpListener::bind(args.addr()).await?;
    api::serve(listener, WidgetService::new(Arc::new(store))).await?;
    Ok(())
}

async fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let widget = Widget::new(args.widget_id, HttpStatusSource::new(args.origin));
    let mut sink = ConsoleSink::stdout();

    tokio::select! {
        report = widget.run(&mut sink) => {
            info!(polls = report.polls, "access revoked, widget stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted");
        }
    }
    Ok(())
}
