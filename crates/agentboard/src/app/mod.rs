mod actions;
mod board;
mod global;
mod maintenance;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(board::watch_command())
        .subcommand(board::list_command())
        .subcommand(board::agent_command())
        .subcommand(actions::pr_command())
        .subcommand(actions::followup_command())
        .subcommand(actions::comment_command())
        .subcommand(actions::issue_command())
        .subcommand(maintenance::cache_command())
}
