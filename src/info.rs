use crate::engine::{EncodePlan, EncodeSettings};
use crate::error::Result;
use crate::source::{Quality, SourceImage};
use crate::utils::format_file_size;
use std::path::Path;

/// What is known about one image before compressing it.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub name: String,
    pub size: u64,
    pub declared_type: String,
    pub accepted: bool,
    pub plan: EncodePlan,
}

impl ImageReport {
    pub fn aspect_ratio(&self) -> f64 {
        let (width, height) = self.plan.natural;
        f64::from(width) / f64::from(height.max(1))
    }

    pub fn is_large_input(&self, settings: &EncodeSettings) -> bool {
        self.size > settings.large_input_threshold
    }
}

pub fn inspect_image(source: &SourceImage, quality: Quality, settings: &EncodeSettings) -> Result<ImageReport> {
    let natural = source.dimensions()?;
    Ok(ImageReport {
        name: source.name().to_string(),
        size: source.len(),
        declared_type: source.media_type().to_string(),
        accepted: source.media_type().is_accepted(),
        plan: EncodePlan::new(natural, source.media_type(), source.len(), quality, settings),
    })
}

pub fn print_image_info(input_path: &Path, quality: Quality, settings: &EncodeSettings) -> Result<()> {
    println!("📊 Analyzing image: {:?}", input_path);

    let source = SourceImage::from_path(input_path)?;
    let report = inspect_image(&source, quality, settings)?;
    let (width, height) = report.plan.natural;

    println!("📋 Basic Information:");
    println!("  📁 File: {}", report.name);
    println!("  📏 Dimensions: {}x{} pixels", width, height);
    println!("  📦 File size: {} bytes ({})", report.size, format_file_size(report.size));
    println!("  🎭 Declared type: {}", report.declared_type);
    println!("  📐 Aspect ratio: {:.2}:1", report.aspect_ratio());

    if !report.accepted {
        println!("\n⚠️  Only JPG and PNG files are accepted for compression");
        return Ok(());
    }

    println!("\n💡 Compression Plan:");
    if report.plan.needs_resize() {
        let (target_width, target_height) = report.plan.target;
        println!(
            "  📏 Downscale to {}x{} (caps {}x{})",
            target_width, target_height, settings.max_width, settings.max_height
        );
    } else {
        println!("  📏 Keep dimensions");
    }
    println!("  🎭 Output type: {}", report.plan.output_type);
    if report.is_large_input(settings) && report.plan.quality < quality {
        println!(
            "  🎯 Quality: {} (capped from {} for files over {})",
            report.plan.quality,
            quality,
            format_file_size(settings.large_input_threshold)
        );
    } else {
        println!("  🎯 Quality: {}", report.plan.quality);
    }

    Ok(())
}
