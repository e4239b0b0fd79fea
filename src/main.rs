use anyhow::Context;
use clap::Parser;
use img_shrink::cli::{Args, Commands};
use img_shrink::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, ORIGINAL_SIZE_PREFIX, WARNING_PREFIX,
};
use img_shrink::info::print_image_info;
use img_shrink::logging::init_logging;
use img_shrink::progress::ProgressSink;
use img_shrink::utils::{calculate_compression_ratio, format_file_size};
use img_shrink::{
    bundle_to_dir, collect_image_files, load_sources, EncodeSettings, Quality, Reencoder, Session,
    ShrinkError,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Compress {
            inputs,
            output,
            quality,
            recursive,
            max_width,
            max_height,
        } => {
            let settings = EncodeSettings::with_caps(max_width, max_height);
            compress(inputs, output, Quality::from_percent(quality)?, recursive, settings).await?;
        }
        Commands::Info {
            input,
            quality,
            max_width,
            max_height,
        } => {
            let settings = EncodeSettings::with_caps(max_width, max_height);
            print_image_info(&input, Quality::from_percent(quality)?, &settings)
                .with_context(|| format!("Failed to analyze {:?}", input))?;
        }
    }

    Ok(())
}

async fn compress(
    inputs: Vec<String>,
    output: PathBuf,
    quality: Quality,
    recursive: bool,
    settings: EncodeSettings,
) -> anyhow::Result<()> {
    println!("🚀 Starting compression...");
    println!("📁 Output: {:?}", output);
    let start_time = Instant::now();

    let mut paths = Vec::new();
    for input in &inputs {
        paths.extend(collect_image_files(input, recursive)?);
    }
    if paths.is_empty() {
        return Err(ShrinkError::NoImageFilesFound(inputs.join(", ")).into());
    }

    let mut session = Session::new();
    let accepted = session.load(load_sources(&paths)?)?;
    if accepted < paths.len() {
        println!(
            "{}  Skipped {} file(s) that are not JPG or PNG",
            WARNING_PREFIX,
            paths.len() - accepted
        );
    }
    println!("📊 Found {} image(s) to compress at quality {}", accepted, quality);

    let engine = Reencoder::new(settings);
    let sink = ProgressSink::new(accepted as u64);
    session
        .compress(&engine, quality, Arc::new(sink.clone()))
        .await?;
    sink.finish("✅ Compression complete");
    let state = session.results();

    let total_before = session.original_total();
    let total_after = state.compressed_total();
    let original_of_successes: u64 = session
        .images()
        .iter()
        .filter(|image| state.get(image.name()).is_some_and(|r| r.is_success()))
        .map(|image| image.len())
        .sum();

    println!("\n📊 Compression Summary:");
    println!("  📁 Images compressed: {}/{}", state.succeeded_count(), state.len());
    println!("  {} {} ({})", ORIGINAL_SIZE_PREFIX, total_before, format_file_size(total_before));
    println!("  {} {} ({})", COMPRESSED_SIZE_PREFIX, total_after, format_file_size(total_after));
    println!(
        "  {} {:.1}%",
        COMPRESSION_RATIO_PREFIX,
        calculate_compression_ratio(original_of_successes, total_after)
    );
    println!("  ⏱️  Total time: {:?}", start_time.elapsed());
    if state.failed_count() > 0 {
        println!("  {}  Failed files: {}", WARNING_PREFIX, state.failed_count());
    }

    if state.succeeded_count() == 0 {
        println!("{}  No images compressed, archive not written", WARNING_PREFIX);
        return Ok(());
    }

    let archive_path = bundle_to_dir(state, &output)?;
    println!("📦 Archive written to {:?}", archive_path);

    Ok(())
}
