//! Detect command - offline motion check between two images.

use std::path::Path;
use std::time::Duration;

use binwatch::motion::{MotionDetector, RegionScanner};

use super::common::{load_config, load_frame};
use crate::error::CliError;

/// Run the detect command.
pub fn run(previous: &Path, current: &Path, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let regions = config.region_set()?;
    let previous = load_frame(previous)?;
    let current = load_frame(current)?;

    let expected = regions.frame_size();
    for frame in [&previous, &current] {
        if frame.dimensions() != expected {
            return Err(CliError::Config(format!(
                "Image is {}x{} but the regions are configured for {}x{}",
                frame.width(),
                frame.height(),
                expected.0,
                expected.1
            )));
        }
    }

    let scanner = RegionScanner::new(
        MotionDetector::new(config.motion.to_motion_config()),
        Duration::ZERO,
    );
    let detections = scanner.measure(&current, &previous, regions.as_slice());

    println!(
        "Motion threshold: {:.1}% of region pixels changed by more than {}",
        config.motion.ratio_threshold * 100.0,
        config.motion.pixel_threshold
    );
    println!();
    println!("{:<4} {:<16} {:>10} {:>10}  {}", "ID", "BIN", "CHANGED", "RATIO", "FIRED");
    for (region, detection) in regions.iter().zip(&detections) {
        println!(
            "{:<4} {:<16} {:>10} {:>9.2}%  {}",
            region.id(),
            region.bin_name(),
            detection.changed_pixels,
            detection.ratio * 100.0,
            if detection.fired { "yes" } else { "" }
        );
    }
    println!();

    match scanner.first_fired(&current, &previous, regions.as_slice()) {
        Some((region, _)) => println!("First fired region: {} ({})", region.id(), region.bin_name()),
        None => println!("No region fired"),
    }
    Ok(())
}
