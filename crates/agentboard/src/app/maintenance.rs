use clap::{Arg, ArgAction, Command};

pub fn cache_command() -> Command {
    Command::new("cache")
        .about("Inspect or clear the merged/closed pull request cache")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .about("List remembered merged or closed pull requests")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("clear").about("Forget every remembered pull request"))
}
