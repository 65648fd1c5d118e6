use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, warn};

use agentboard_config::{BoardConfig, ConfigError, validate_config};
use agentboard_core::{BoardError, DashboardFilter, FetchError, HttpTransport, SyncContext};
use agentboard_paths::BoardPaths;

use crate::color;

pub type Context = Arc<SyncContext<HttpTransport>>;

/// Load configuration with warning on errors, then apply `--relay`.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
///
/// An invalid `--relay` value is a hard error.
pub fn load_config_with_warning(matches: &ArgMatches) -> Result<BoardConfig, Box<dyn std::error::Error>> {
    let config = match BoardConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{}",
                color::warning(&format!(
                    "Warning: Could not load config: {}. Using defaults.\n\
                     Tip: Check ~/.agentboard/config.toml and ./.agentboard/config.toml for syntax errors.",
                    e
                ))
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                error_code = e.error_code(),
                "Config load failed, using defaults"
            );
            BoardConfig::default()
        }
    };

    let relay = matches.get_one::<String>("relay").map(String::as_str);
    match apply_relay_override(config, relay) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!("{}", color::error(&format!("❌ {}", e)));
            eprintln!("{}", color::hint("   Hint: Pass a full URL such as --relay http://localhost:3000"));
            error!(
                event = "cli.config.relay_override_failed",
                error = %e,
                error_code = e.error_code()
            );
            Err(e.into())
        }
    }
}

/// Set the relay base URL from the command line and re-validate.
pub fn apply_relay_override(mut config: BoardConfig, relay: Option<&str>) -> Result<BoardConfig, ConfigError> {
    if let Some(relay) = relay {
        config.relay.base_url = Some(relay.to_string());
        validate_config(&config)?;
    }
    Ok(config)
}

/// `--all` shows everything; otherwise the `[view]` config decides.
pub fn dashboard_filter(config: &BoardConfig, all: bool) -> DashboardFilter {
    if all {
        DashboardFilter {
            hide_expired: false,
            show_closed: true,
        }
    } else {
        DashboardFilter::from(&config.view)
    }
}

/// Build the HTTP transport and the sync context over `~/.agentboard/`.
pub fn open_context(config: BoardConfig) -> Result<Context, Box<dyn std::error::Error>> {
    let paths = BoardPaths::resolve().map_err(|e| {
        eprintln!("{}", color::error(&format!("❌ {}", e)));
        e
    })?;
    let transport = HttpTransport::from_config(&config).map_err(|e| {
        report_fetch_error("Failed to set up relay client", &e);
        e
    })?;
    Ok(SyncContext::open(config, transport, &paths))
}

pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Print a relay failure with a hint matched to its kind.
pub fn report_fetch_error(action: &str, e: &FetchError) {
    eprintln!("{}", color::error(&format!("❌ {}: {}", action, e)));
    match e {
        FetchError::Transport { .. } => eprintln!(
            "{}",
            color::hint("   Hint: Is the relay running? Set --relay or relay.base_url in config.toml.")
        ),
        FetchError::Upstream { status: 404, .. } => {
            eprintln!("{}", color::hint("   Hint: Check the id or URL."))
        }
        e if e.is_retryable() => {
            eprintln!("{}", color::hint("   Hint: The relay may be rate limited. Try again shortly."))
        }
        _ => {}
    }
    error!(
        event = "cli.relay.request_failed",
        action = action,
        error = %e,
        error_code = e.error_code()
    );
}
