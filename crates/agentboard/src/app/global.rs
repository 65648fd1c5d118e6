use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("agentboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch remote coding agents and the pull requests they open")
        .long_about("agentboard polls the relay for your remote coding agents, keeps their pull request statuses and review comments fresh, and remembers merged or closed pull requests across runs so they are never fetched again.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("relay")
                .long("relay")
                .help("Relay base URL (overrides config and AGENTBOARD_RELAY_URL)")
                .value_name("URL")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
