//! CLI entry point for near-duplicate image fragment extraction

use clap::Parser;
use fragdedup::io::cli::{Cli, CommandRunner, init_logging};

fn main() -> fragdedup::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.default_log_level());
    CommandRunner::new(cli).run()
}
