//! Finalize output: the CSV file and the statistics block.

use std::path::Path;

use anyhow::Context;

use crate::schema::{Reading, WindSample};
use crate::stats::{FieldStats, Summary};
use crate::util;

const RULE_WIDTH: usize = 50;

/// Writes every reading to `path`, header first.
///
/// Any existing file is truncated. The header row comes from the
/// `Reading` field names: `timestamp,topic,wind_speed,wind_direction`.
pub fn write_csv(path: &Path, readings: &[Reading]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for reading in readings {
        writer
            .serialize(reading)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Progress line printed for every accepted reading.
pub fn progress_line(count: usize, target: usize, sample: &WindSample) -> String {
    format!(
        "Received reading {}/{}: Speed={}, Direction={}",
        count, target, sample.speed, sample.direction
    )
}

/// Line printed for a payload that did not parse.
pub fn skipped_line(text: &str) -> String {
    format!("Skipped invalid format: {}", text)
}

/// Renders the final statistics block.
///
/// Speed values use three decimals; direction values use one
/// decimal and a degree sign. Standard deviation lines are left
/// out entirely below two samples.
pub fn render_summary(path: &Path, summary: &Summary) -> String {
    let rule = util::rule(RULE_WIDTH);

    let mut lines = vec![
        String::new(),
        rule.clone(),
        "DATA COLLECTION COMPLETE!".to_string(),
        rule.clone(),
        format!("File saved as: {}", path.display()),
        format!("Total readings collected: {}", summary.count),
        format!("Time taken: {:.2} seconds", summary.duration.as_secs_f64()),
        match summary.rate() {
            Some(rate) => format!("Collection rate: {:.2} readings/second", rate),
            None => "Collection rate: n/a".to_string(),
        },
    ];

    if let (Some(speed), Some(direction)) = (&summary.speed, &summary.direction) {
        lines.extend(field_lines("WIND SPEED STATISTICS", speed, 3, ""));
        lines.extend(field_lines("WIND DIRECTION STATISTICS", direction, 1, "°"));
    }

    lines.push(rule);
    lines.push(String::new());
    lines.join("\n")
}

fn field_lines(title: &str, stats: &FieldStats, precision: usize, unit: &str) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("{}:", title),
        format!("   Average: {:.*}{}", precision, stats.mean, unit),
        format!("   Min: {:.*}{}", precision, stats.min, unit),
        format!("   Max: {:.*}{}", precision, stats.max, unit),
    ];
    if let Some(sd) = stats.std_dev {
        lines.push(format!("   Standard deviation: {:.*}{}", precision, sd, unit));
    }
    lines
}
