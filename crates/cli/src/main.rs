use clap::Parser;

use vanstock_cli::{Cli, LogFormatArg, resolve_config, run};
use vanstock_observability::{LogFormat, LogOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    vanstock_observability::tracing::init(LogOptions {
        format: match cli.log_format {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        },
        ..LogOptions::default()
    });

    let config = resolve_config(&cli)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &config, &mut out).await
}
