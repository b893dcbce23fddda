//! # slackbridge CLI
//!
//! Command-line interface for the slackbridge library.

use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;

use slackbridge::BridgeError;
use slackbridge::cli::Args;
use slackbridge::export::read_snapshot;
use slackbridge::merge::merge_exports;
use slackbridge::output::write_json;
use slackbridge::overrides::Overrides;
use slackbridge::report::{CollectingReporter, Reporter, TracingReporter, Warning};
use slackbridge::transform::{DirUploadReader, Transformer};

/// Logs every warning and keeps a copy for the summary.
struct SummaryReporter {
    collected: CollectingReporter,
}

impl Reporter for SummaryReporter {
    fn report(&self, warning: Warning) {
        TracingReporter.report(warning.clone());
        self.collected.report(warning);
    }
}

fn main() {
    let args = <Args as ClapParser>::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), BridgeError> {
    let total_start = Instant::now();

    if args.output.is_dir() {
        return Err(BridgeError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output file {} is a directory", args.output.display()),
        )));
    }

    println!("📦 slackbridge v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("👥 Team:    {}", args.team);
    for file in &args.files {
        println!("📂 Input:   {}", file.display());
    }
    println!("💾 Output:  {}", args.output.display());
    println!();

    // Step 1: Load
    println!("⏳ Loading {} export(s)...", args.files.len());
    let load_start = Instant::now();
    let snapshots = args
        .files
        .iter()
        .map(read_snapshot)
        .collect::<Result<Vec<_>, _>>()?;
    println!("   Loaded in {:.2}s", load_start.elapsed().as_secs_f64());

    // Step 2: Merge
    if snapshots.len() > 1 {
        println!("🔀 Merging exports...");
    }
    let merged = merge_exports(snapshots)?;
    println!(
        "   {} channels, {} users, {} posts",
        merged.channel_count(),
        merged.users.len(),
        merged.post_count()
    );

    // Step 3: Overrides
    let reporter = Arc::new(SummaryReporter {
        collected: CollectingReporter::new(),
    });
    let overrides = Overrides::from_files(
        args.user_overrides.as_deref(),
        args.channel_overrides.as_deref(),
        &*reporter,
    )?;

    // Step 4: Transform
    println!("🔧 Transforming...");
    let transform_start = Instant::now();
    let mut transformer = Transformer::new()
        .with_config(args.transform_config())
        .with_reporter(reporter.clone())
        .with_overrides(overrides);
    if let Some(dir) = &args.archive_dir {
        transformer = transformer.with_upload_reader(DirUploadReader::new(dir));
    }
    let intermediate = transformer.transform(&merged);
    println!(
        "   Done in {:.2}s",
        transform_start.elapsed().as_secs_f64()
    );

    // Step 5: Write
    println!("💾 Writing JSON...");
    write_json(&intermediate, &args.team, &args.output)?;

    println!();
    println!("✅ Done! Output saved to {}", args.output.display());

    let warnings = reporter.collected.warnings();
    let errors = warnings.iter().filter(|w| w.kind.is_error()).count();

    println!();
    println!("📊 Summary:");
    println!("   Users:     {}", intermediate.users_by_id.len());
    println!("   Channels:  {}", intermediate.channels().count());
    println!("   Posts:     {}", intermediate.post_count());
    println!("   Warnings:  {}", warnings.len() - errors);
    println!("   Errors:    {}", errors);

    println!();
    println!("⚡ Performance:");
    println!(
        "   Total time:  {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}
