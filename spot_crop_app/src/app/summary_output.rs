use std::{
    io::{prelude::*, BufWriter},
    path::Path,
};

use spot_crop_lib::RunSummary;

use crate::app::*;

pub fn print_summary(
    summary: &RunSummary,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match format {
        OutputFormat::Normal => write_normal(&mut writer, summary, output_dir),
        OutputFormat::Json => write_json(&mut writer, summary),
    }
}

fn write_normal<W: Write>(
    writer: &mut W,
    summary: &RunSummary,
    output_dir: &Path,
) -> Result<(), AppError> {
    writeln!(writer, "Processing complete!")?;
    writeln!(writer, "Images found: {}", summary.images_found)?;
    writeln!(writer, "Images processed: {}", summary.images_processed)?;
    for image in &summary.images {
        writeln!(writer, "    {}: {} spots", image.name, image.spots)?;
    }
    if summary.images_skipped > 0 {
        writeln!(writer, "Images skipped: {}", summary.images_skipped)?;
        for skipped in &summary.skipped {
            writeln!(writer, "    {}: {}", skipped.name, skipped.reason)?;
        }
    }
    writeln!(writer, "Total spots found: {}", summary.total_spots)?;
    writeln!(writer, "Results saved to: {}", output_dir.display())?;
    writer.flush()?;

    Ok(())
}

fn write_json<W: Write>(writer: &mut W, summary: &RunSummary) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
