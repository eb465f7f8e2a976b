//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::model::{InventoryRecord, WidgetId};

/// Widget preloaded by `serve --seed-demo`.
pub const DEMO_WIDGET_ID: &str = "ID-DO-SEU-PRIMEIRO-CLIENTE";

/// Log filter from a `RUST_LOG` value, `info` when unset or unparseable.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[derive(Debug, Parser)]
#[command(name = "slot-counter", version, about = "Scarcity counter backend and widget client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run a widget against a server and print its banner.
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "SLOT_COUNTER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(long, env = "SLOT_COUNTER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Preload the demo widget (100 slots, 50 sold).
    #[arg(long)]
    pub seed_demo: bool,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Records to load before serving.
    pub fn seed(&self) -> Vec<(WidgetId, InventoryRecord)> {
        if self.seed_demo {
            vec![(DEMO_WIDGET_ID.to_string(), InventoryRecord::new(100, 50))]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Origin the widget was loaded from; the API lives under it.
    #[arg(long, env = "SLOT_COUNTER_ORIGIN")]
    pub origin: Url,

    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub widget_id: WidgetId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_honors_rust_log() {
        use tracing::level_filters::LevelFilter;

        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["slot-counter", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.addr(), "0.0.0.0:3000".parse().unwrap());
        assert!(args.seed().is_empty());
    }

    #[test]
    fn serve_with_demo_seed() {
        let cli = Cli::try_parse_from([
            "slot-counter",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--seed-demo",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(
            args.seed(),
            vec![(DEMO_WIDGET_ID.to_string(), InventoryRecord::new(100, 50))]
        );
    }

    #[test]
    fn watch_requires_widget_id() {
        assert!(
            Cli::try_parse_from(["slot-counter", "watch", "--origin", "http://localhost:3000"])
                .is_err()
        );
    }

    #[test]
    fn watch_rejects_empty_widget_id() {
        let err = Cli::try_parse_from([
            "slot-counter",
            "watch",
            "--origin",
            "http://localhost:3000",
            "--widget-id",
            "",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn watch_parses_origin() {
        let cli = Cli::try_parse_from([
            "slot-counter",
            "watch",
            "--origin",
            "http://localhost:3000",
            "--widget-id",
            "w1",
        ])
        .unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.origin.as_str(), "http://localhost:3000/");
        assert_eq!(args.widget_id, "w1");
    }
}
