use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::SizingCommand;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = SizingCommand::parse();
    let stdout = std::io::stdout();
    command.run(&mut stdout.lock())
}
