use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("watchsync")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("watchsync")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("run")
                .about(
                    "Runs the configured phases in order: reconcile duplicate watches, crawl \
                the site section, sync the collected URLs to the watch service.",
                )
                .arg(
                    arg!(-p --"phases" <LIST>)
                        .required(false)
                        .help("Comma-separated phases to run (reconcile,crawl,sync). Overrides RUN_PHASES."),
                )
                .arg(
                    arg!(-b --"base-url" <URL>)
                        .required(false)
                        .help("Base address of the watch service. Overrides WATCH_BASE_URL."),
                )
                .arg(
                    arg!(-k --"api-key" <KEY>)
                        .required(false)
                        .help("API key for the watch service. Overrides WATCH_API_KEY."),
                )
                .arg(
                    arg!(-t --"tag" <TAG>)
                        .required(false)
                        .help("Tag label attached to created watches. Overrides WATCH_TAG."),
                )
                .arg(
                    arg!(-d --"data-dir" <PATH>)
                        .required(false)
                        .help("Directory holding the persisted URL list. Overrides DATA_DIR.")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-s --"seed" <URL>)
                        .required(false)
                        .help("Crawl seed URL (repeatable). Overrides SEED_URLS.")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-m --"marker" <PATH>)
                        .required(false)
                        .help("Path marker a link must contain to stay in crawl scope. Overrides SCOPE_MARKER."),
                )
                .arg(
                    arg!(--"no-year-filter")
                        .required(false)
                        .help("Sync every collected URL, ignoring year tokens")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_command() {
        command_argument_builder().debug_assert();
    }
}
