use anyhow::{Context, Result};
use mailcheck_bulk::{BulkVerifier, clean_email_list};
use tracing_subscriber::EnvFilter;

#[path = "mailcheck-bulk/args.rs"]
mod args;
#[path = "mailcheck-bulk/output.rs"]
mod output;

use args::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if let Some(Commands::Clean { source, dest }) = &cli.cmd {
        let count = clean_email_list(source, dest)
            .with_context(|| format!("clean {}", source.display()))?;
        println!("{count} adresses écrites dans {}", dest.display());
        return Ok(());
    }

    let verifier = BulkVerifier::with_defaults(cli.bulk_options()?, cli.probe_options())
        .context("initialise the validator")?;

    let pb = output::progress_bar(cli.quiet)?;
    let summary = verifier
        .run_with_progress(|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .context("bulk validation failed")?;
    pb.finish_and_clear();

    output::write_summary(&summary, &cli.format)
}
