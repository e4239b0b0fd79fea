use crate::constants::DEFAULT_QUALITY;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Shrink JPEG and PNG images and bundle them into a zip archive",
    long_about = "img-shrink re-encodes JPEG and PNG images at a reduced resolution and quality. \
                  Images larger than 1920x1080 are scaled down proportionally, PNG inputs are \
                  re-encoded as JPEG, and a result is never larger than its original.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink compress photo.jpg scan.png -o ./out -q 75\n  \
    img-shrink compress ./images -r -o ./out\n  \
    img-shrink compress \"./images/*.png\" -o ./out\n  \
    img-shrink info photo.png"
)]
pub struct Args {
    #[arg(short = 'v', long, global = true, help = "Show debug logging")]
    pub verbose: bool,

    #[arg(short = 'Q', long, global = true, conflicts_with = "verbose", help = "Only log errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress images and write compressed_images.zip",
        long_about = "Compress every given image concurrently and bundle the successful results \
                      into compressed_images.zip inside the output directory. Only JPG and PNG \
                      files are accepted; others are skipped, and the run fails if none remain."
    )]
    Compress {
        #[arg(
            required = true,
            help = "Input files, directories or glob patterns",
            long_help = "Each input can be a file path, a directory, or a glob expression. \
                         Examples: photo.jpg, './images', './images/*.png'"
        )]
        inputs: Vec<String>,

        #[arg(short = 'o', long, help = "Output directory for the archive")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            default_value_t = DEFAULT_QUALITY,
            value_parser = clap::value_parser!(u8).range(0..=100),
            help = "Compression quality (0-100, default: 80)",
            long_help = "Quality percentage shared by every image in the batch. \
                         Files larger than 1 MiB are capped at 60."
        )]
        quality: u8,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Maximum width in pixels (default: 1920)"
        )]
        max_width: Option<u32>,

        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Maximum height in pixels (default: 1080)"
        )]
        max_height: Option<u32>,
    },

    #[command(
        about = "Display image information and the planned compression",
        long_about = "Show dimensions, size and declared type of an image, along with the \
                      target size, output type and quality the compressor would use."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,

        #[arg(
            short = 'q',
            long,
            default_value_t = DEFAULT_QUALITY,
            value_parser = clap::value_parser!(u8).range(0..=100),
            help = "Quality to plan with (0-100, default: 80)"
        )]
        quality: u8,

        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Maximum width in pixels (default: 1920)"
        )]
        max_width: Option<u32>,

        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Maximum height in pixels (default: 1080)"
        )]
        max_height: Option<u32>,
    },
}
