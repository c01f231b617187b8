use clap::Parser;
use whispernotes_cli::Cli;
use whispernotes_core::{default_log_level, init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = std::env::temp_dir().join("whispernotes-logs").join("cli");
    if let Err(err) = init_logging(&LoggingConfig::new(default_log_level(), log_dir)) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let stdout = std::io::stdout();
    whispernotes_cli::run(&cli, &mut stdout.lock())
}
