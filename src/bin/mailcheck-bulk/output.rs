use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use mailcheck_bulk::{RunStats, RunSummary};

pub fn progress_bar(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

pub fn write_summary(summary: &RunSummary, format: &str) -> Result<()> {
    match format {
        "human" => {
            write_human(summary);
            Ok(())
        }
        "json" => write_json(summary),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

fn write_human(summary: &RunSummary) {
    match &summary.stats {
        None => println!("Aucune nouvelle adresse à valider."),
        Some(stats) => {
            println!(
                "Validated {} addresses in {} batch(es).",
                summary.scheduled,
                summary.batches.len()
            );
            print!("{stats}");
        }
    }
}

#[derive(serde::Serialize)]
struct SummaryPayload<'a> {
    scheduled: usize,
    appended: usize,
    batches: &'a [usize],
    stats: Option<&'a RunStats>,
}

fn write_json(summary: &RunSummary) -> Result<()> {
    let payload = SummaryPayload {
        scheduled: summary.scheduled,
        appended: summary.appended(),
        batches: &summary.batches,
        stats: summary.stats.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
