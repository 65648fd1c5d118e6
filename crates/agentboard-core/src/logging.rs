use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the JSON tracing layer on stderr.
///
/// `quiet` silences everything unless `RUST_LOG` is set explicitly. Calling
/// this more than once is harmless; only the first subscriber wins.
pub fn init_logging(quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));

    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn default_directive(quiet: bool) -> &'static str {
    if quiet {
        "off"
    } else {
        "agentboard=info,agentboard_core=info,agentboard_config=info"
    }
}
