pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod reconcile;
pub mod sync;

pub use client::WatchClient;
pub use config::{Config, Phase};
pub use error::SyncError;
pub use filter::YearFilter;
pub use model::Watch;

use colored::Colorize;

pub fn print_banner() {
    println!("{}", "watchsync".bright_cyan().bold());
    println!(
        "{}",
        format!("v{} - keep a watch list in step with a crawl", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}
