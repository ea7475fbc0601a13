use clap::ValueEnum;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "CONCIERGE_LOG";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Installs the global subscriber. Output goes to stderr so stdout stays
/// clean for `--json`.
pub fn init(format: LogFormat) {
    let filter = build_filter(
        std::env::var(LOG_ENV)
            .ok()
            .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok()),
    );
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Compact => Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true),
        ),
    };
    // A subscriber may already be installed when embedded; keep that one.
    let _ = Registry::default().with(layer).with(filter).try_init();
}

fn build_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
