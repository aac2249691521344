use clap::Parser;
use env_logger::Env;
use sync_tool::cli::Cli;
use sync_tool::commands;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON envelope, so all logging goes to stderr
    let filter = if cli.command.connection().verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    commands::execute(cli.command)
}
