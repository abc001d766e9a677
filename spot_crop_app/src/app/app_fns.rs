use std::{error::Error, path::PathBuf};

use eyre::WrapErr;
use spot_crop_lib::*;

use crate::app::*;

// * read cfg
// * find input files
// * create output dirs
// * crop every image
// * print summary

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    match run_app_inner(&cfg) {
        Ok(summary) => {
            match summary_output::print_summary(
                &summary,
                cfg.output_cfg.format,
                &cfg.dir_cfg.output_dir,
            ) {
                Ok(()) => 0,
                Err(e) => {
                    print_fatal_err(e.into(), cfg.output_cfg.verbosity);
                    1
                }
            }
        }
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    }
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<RunSummary> {
    cfg.detection.validate()?;

    let input_files = match input_files::find_input_files(
        &cfg.dir_cfg.input_dir,
        &cfg.dir_cfg.extensions,
    ) {
        Ok(files) => files,
        Err(AppError::SpotCrop(e @ spot_crop_lib::Error::NoInputFound(_))) => {
            warn!("{e}");
            return Ok(RunSummary::new(0));
        }
        Err(e) => return Err(e.into()),
    };

    let mut sink = DirectorySink::new(&cfg.dir_cfg.output_dir, &cfg.dir_cfg.temp_dir)?;
    if !cfg.output_cfg.debug_images {
        sink = sink.without_diagnostics();
    }

    crop_all(&cfg.detection, &input_files, &mut sink)
}

/// Crop every image in `input_files`, in order. Images that cannot be decoded are skipped;
/// any other error stops the batch.
fn crop_all(
    options: &DetectionOptions,
    input_files: &[PathBuf],
    sink: &mut dyn ArtifactSink,
) -> eyre::Result<RunSummary> {
    let cropper = SpotCropper::from_options(*options)?;
    let mut summary = RunSummary::new(input_files.len());

    for (i, src_path) in input_files.iter().enumerate() {
        let name = input_files::base_name(src_path);
        info!("processing {}/{}: {}", i + 1, input_files.len(), name);

        match cropper.process_file(src_path, sink) {
            Ok(report) => {
                info!("  found {} spots", report.spot_count());
                summary.record(&report);
            }
            Err(e @ spot_crop_lib::Error::InvalidImage { .. }) => {
                warn!("skipping {}: {e}", src_path.display());
                summary.record_skipped(name, &e);
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("while processing {}", src_path.display()));
            }
        }
    }

    debug!(
        "{} of {} images processed, {} spots",
        summary.images_processed, summary.images_found, summary.total_spots
    );

    Ok(summary)
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.add_filter_ignore_str("png");

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}
