use std::path::Path;
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Installs the global subscriber: human-readable events on stderr, filtered
/// by `RUST_LOG` (INFO by default), plus a Chrome trace when `chrome_trace`
/// is given. Keep the returned guard alive until the run ends or the trace
/// file is left incomplete.
pub fn init(chrome_trace: Option<&Path>) -> Option<FlushGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (chrome_layer, guard) = match chrome_trace {
        Some(path) => {
            let (layer, guard) = ChromeLayerBuilder::new().file(path).build();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(chrome_layer)
        .init();

    guard
}
