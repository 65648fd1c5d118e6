use clap::{Arg, ArgAction, Command};

pub fn pr_command() -> Command {
    Command::new("pr")
        .about("Inspect or act on a pull request")
        .subcommand_required(true)
        .subcommand(
            Command::new("status")
                .about("Show the review status of a pull request")
                .arg(pr_url_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("comment")
                .about("Post a comment on a pull request")
                .arg(pr_url_arg())
                .arg(
                    Arg::new("body")
                        .help("Comment text")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("ready")
                .about("Mark a draft pull request as ready for review")
                .arg(pr_url_arg()),
        )
}

pub fn followup_command() -> Command {
    Command::new("followup")
        .about("Send a follow-up instruction to an agent")
        .arg(
            Arg::new("id")
                .help("Agent id")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("message")
                .help("Instruction text")
                .required(true)
                .index(2),
        )
}

pub fn comment_command() -> Command {
    Command::new("comment")
        .about("Post a comment on an issue")
        .arg(
            Arg::new("issue-url")
                .help("https://github.com/<owner>/<repo>/issues/<n>")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("body")
                .help("Comment text")
                .required(true)
                .index(2),
        )
}

pub fn issue_command() -> Command {
    Command::new("issue")
        .about("Open issues in repositories your agents work on")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a GitHub issue, optionally assigned to a new agent")
                .arg(
                    Arg::new("repo")
                        .help("owner/repo, as listed by 'agentboard issue repos'")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("title")
                        .help("Issue title")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .help("Issue body"),
                )
                .arg(
                    Arg::new("assign")
                        .long("assign")
                        .help("Start an agent on the new issue")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("repos").about("List repositories your agents have worked on"))
}

fn pr_url_arg() -> Arg {
    Arg::new("url")
        .help("https://github.com/<owner>/<repo>/pull/<n>")
        .required(true)
        .index(1)
}
