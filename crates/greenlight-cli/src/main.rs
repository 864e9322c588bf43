use clap::Parser;

mod args;
mod commands;

use args::{Cli, Command};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Audit(args) => commands::audit(args).await,
        Command::Assess(args) => commands::assess(args).await,
    };
    if let Err(e) = result {
        eprintln!("fatal: {e:?}");
        std::process::exit(2);
    }
}
