use clap::{Arg, ArgAction, Command};

pub fn watch_command() -> Command {
    Command::new("watch")
        .about("Poll continuously and redraw the board after every cycle")
        .arg(
            Arg::new("interval")
                .long("interval")
                .help("Seconds between polls (overrides sync.poll_interval_secs)")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Include expired agents and merged or closed pull requests")
                .action(ArgAction::SetTrue),
        )
}

pub fn list_command() -> Command {
    Command::new("list")
        .about("Run one poll cycle and print the board")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Include expired agents and merged or closed pull requests")
                .action(ArgAction::SetTrue),
        )
}

pub fn agent_command() -> Command {
    Command::new("agent")
        .about("Show one agent with its conversation, pull request and comments")
        .arg(
            Arg::new("id")
                .help("Agent id")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
}
