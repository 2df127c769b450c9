use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("reaper")
        .about("Find stale cloud resources and delete them, optionally after warning their owners")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase logging verbosity (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as JSON lines on stderr")
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
            Arg::new("json")
                .long("json")
                .help("Print the run report as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to the config file (default: ~/.reaper/config.toml)")
                .value_name("PATH")
                .global(true),
        )
        .arg(
            Arg::new("os-cloud")
                .long("os-cloud")
                .help("Named cloud from clouds.yaml; also keys the flag state")
                .value_name("NAME")
                .global(true),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .help("Directory for flag state files (default: ~/.reaper/state)")
                .value_name("DIR")
                .global(true),
        )
        .subcommand(with_common_args(
            Command::new("server")
                .about("Clean up virtual servers")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .help("Regex the server name must start with")
                        .value_name("REGEX"),
                )
                .arg(
                    Arg::new("skip-name")
                        .long("skip-name")
                        .short('s')
                        .help("Regex for server names that are never deleted")
                        .value_name("REGEX"),
                ),
        ))
        .subcommand(with_common_args(
            Command::new("fip")
                .about("Clean up floating IP addresses")
                .arg(
                    Arg::new("with-attached")
                        .long("with-attached")
                        .help("Also consider addresses attached to a port")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("floating-subnet")
                        .long("floating-subnet")
                        .help("Only floating addresses inside this CIDR")
                        .value_name("CIDR"),
                )
                .arg(
                    Arg::new("static-subnet")
                        .long("static-subnet")
                        .help("Only addresses whose fixed IP is inside this CIDR")
                        .value_name("CIDR"),
                ),
        ))
}

/// Arguments every resource subcommand takes.
fn with_common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("age")
                .long("age")
                .short('a')
                .help("Minimum age, e.g. 3d, 2w, 6m, 1y, 1w3d12h")
                .value_name("INTERVAL"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .short('f')
                .help("Actually act; without it nothing is stored, deleted or mailed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .short('e')
                .help("Warn resource owners by email before deletion")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .help("From address for warning emails (required with --email)")
                .value_name("ADDRESS"),
        )
        .arg(
            Arg::new("recipient")
                .long("recipient")
                .help("Send every warning to this address instead of the owners")
                .value_name("ADDRESS"),
        )
        .arg(
            Arg::new("smtp-host")
                .long("smtp-host")
                .help("Submit warning emails to this SMTP relay instead of sendmail")
                .value_name("HOST"),
        )
        .arg(
            Arg::new("smtp-port")
                .long("smtp-port")
                .help("Port of the SMTP relay (default: 25)")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("phase")
                .long("phase")
                .help("Two-phase mode: 'flag' marks and warns, 'sweep' deletes what was flagged")
                .value_parser(["flag", "sweep"]),
        )
}
