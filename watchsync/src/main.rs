use colored::Colorize;
use watchsync::commands::command_argument_builder;
use watchsync::handlers;
use watchsync_core::{Config, print_banner};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("run", sub_matches)) => {
            tracing_subscriber::fmt::init();

            let config = match Config::from_env() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{} {}", "✗".red(), e);
                    std::process::exit(1);
                }
            };
            let config = match handlers::apply_cli_overrides(config, sub_matches) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{} {}", "✗".red(), e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = handlers::handle_run(config).await {
                eprintln!("{} {}", "✗".red(), e);
                std::process::exit(1);
            }
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
