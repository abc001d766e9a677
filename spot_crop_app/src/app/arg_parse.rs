use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use clap::{value_parser, ArgAction::*};
use spot_crop_lib::*;

use crate::app::*;

// file locations
const INPUT_DIR: &str = "Input directory";
const OUTPUT_DIR: &str = "Output directory";
const TEMP_DIR: &str = "Temp directory";
const EXTENSIONS: &str = "Input file extensions";

// detection
const THRESHOLD: &str = "Threshold";
const MIN_AREA: &str = "Minimum area";
const MAX_AREA: &str = "Maximum area";
const CONNECTIVITY: &str = "Connectivity";
const BLUR_KERNEL: &str = "Blur kernel size";
const BLUR_SIGMA: &str = "Blur sigma";

// cropping
const CROP_HEIGHT: &str = "Crop height";

// outputs
const NO_DEBUG_IMAGES: &str = "No debug images";
const OUTPUT_FORMAT: &str = "Format";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 15] = [
    //
    // file locations
    INPUT_DIR,
    OUTPUT_DIR,
    TEMP_DIR,
    EXTENSIONS,
    //
    // detection
    THRESHOLD,
    MIN_AREA,
    MAX_AREA,
    CONNECTIVITY,
    BLUR_KERNEL,
    BLUR_SIGMA,
    //
    // cropping
    CROP_HEIGHT,
    //
    //outputs
    NO_DEBUG_IMAGES,
    OUTPUT_FORMAT,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Spot crop")
        .version(clap::crate_version!())
        .about("Find small dark spots in photographs and crop a fixed-height band around each one");

    clap_app = clap_app.arg(
        clap::Arg::new(INPUT_DIR)
            .long("input-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .default_value("inputs")
            .help("Directory containing the photographs to scan. Subdirectories are not searched.")
            .display_order(get_ordering(INPUT_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_DIR)
            .long("output-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .default_value("cropped_spots")
            .help("Directory the crops are written to, as <name>-spot-<n>.png. Created if missing.")
            .display_order(get_ordering(OUTPUT_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(TEMP_DIR)
            .long("temp-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .default_value("temp")
            .help("Directory the annotated overview (<name>-output.png) and the detection mask (<name>-threshold.png) are written to. Created if missing.")
            .display_order(get_ordering(TEMP_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(EXTENSIONS)
            .long("extensions")
            .num_args(0..)
            .value_parser(value_parser!(OsString))
            .value_delimiter(',')
            .action(Append)
            .default_values(DEFAULT_INPUT_EXTENSIONS)
            .help("File extensions to process, in processing order. Matching is case sensitive. Extensions must be comma separated with no spaces, e.g '--extensions jpg,png'")
            .display_order(get_ordering(EXTENSIONS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THRESHOLD)
            .long("threshold")
            .num_args(1)
            .value_parser(value_parser!(u8))
            .default_value(DEFAULT_THRESHOLD_VALUE.to_string())
            .help("Intensity cutoff between 0 and 255. After smoothing, pixels darker than this are candidate spot pixels. Lower values only detect darker spots.")
            .display_order(get_ordering(THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MIN_AREA)
            .long("min-area")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MIN_AREA.to_string())
            .help("Spots must contain more than this many pixels")
            .display_order(get_ordering(MIN_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_AREA)
            .long("max-area")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MAX_AREA.to_string())
            .help("Spots must contain fewer than this many pixels")
            .display_order(get_ordering(MAX_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CONNECTIVITY)
            .long("connectivity")
            .num_args(1)
            .value_parser(value_parser!(ConnectivityArg))
            .default_value("eight")
            .help("Whether pixels touching only at a corner belong to the same spot (eight) or not (four)")
            .display_order(get_ordering(CONNECTIVITY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(BLUR_KERNEL)
            .long("blur-kernel")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_BLUR_KERNEL_SIZE.to_string())
            .help("Size of the Gaussian kernel used to smooth images before thresholding. Must be odd. 1 disables smoothing.")
            .display_order(get_ordering(BLUR_KERNEL)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(BLUR_SIGMA)
            .long("blur-sigma")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .default_value(DEFAULT_BLUR_SIGMA.to_string())
            .help("Standard deviation of the smoothing kernel. 0 derives it from the kernel size.")
            .display_order(get_ordering(BLUR_SIGMA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CROP_HEIGHT)
            .long("crop-height")
            .num_args(1)
            .value_parser(value_parser!(u32).range(1..))
            .default_value(DEFAULT_CROP_HEIGHT.to_string())
            .help("Height in pixels of each crop. Crops always span the full image width. Images shorter than this are cropped to their full height.")
            .display_order(get_ordering(CROP_HEIGHT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(NO_DEBUG_IMAGES)
            .long("no-debug-images")
            .help("Do not write the annotated overview and the detection mask")
            .num_args(0)
            .action(SetTrue)
            .display_order(get_ordering(NO_DEBUG_IMAGES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .help("Whether to print the final summary as normal text, or JSON.")
            .value_parser(value_parser!(OutputFormat))
            .default_value("normal")
            .num_args(1)
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir().expect("failed to extract cwd");
    let args = build_app().get_matches();
    cfg_from_matches(&cwd, &args)
}

fn cfg_from_matches(cwd: &Path, args: &clap::ArgMatches) -> AppCfg {
    let dir_arg = |name: &str| {
        let dir = args
            .get_one::<PathBuf>(name)
            .expect("This argument has a default value");
        absolutify_path(cwd, dir)
    };

    let dir_cfg = DirCfg {
        input_dir: dir_arg(INPUT_DIR),
        output_dir: dir_arg(OUTPUT_DIR),
        temp_dir: dir_arg(TEMP_DIR),
        extensions: args
            .get_many::<OsString>(EXTENSIONS)
            .expect("This argument has a default value")
            .map(|ext| ext.to_string_lossy().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect(),
    };

    let detection = DetectionOptions {
        threshold: *args
            .get_one::<u8>(THRESHOLD)
            .expect("This argument has a default value"),
        min_area: *args
            .get_one::<u32>(MIN_AREA)
            .expect("This argument has a default value"),
        max_area: *args
            .get_one::<u32>(MAX_AREA)
            .expect("This argument has a default value"),
        crop_height: *args
            .get_one::<u32>(CROP_HEIGHT)
            .expect("This argument has a default value"),
        blur_kernel_size: *args
            .get_one::<u32>(BLUR_KERNEL)
            .expect("This argument has a default value"),
        blur_sigma: *args
            .get_one::<f64>(BLUR_SIGMA)
            .expect("This argument has a default value"),
        connectivity: match args.get_one::<ConnectivityArg>(CONNECTIVITY) {
            Some(ConnectivityArg::Four) => Connectivity::Four,
            Some(ConnectivityArg::Eight) | None => Connectivity::Eight,
        },
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let output_cfg = OutputCfg {
        format: *args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .expect("This argument has a default value"),
        verbosity,
        debug_images: !args.get_flag(NO_DEBUG_IMAGES),
    };

    AppCfg {
        dir_cfg,
        detection,
        output_cfg,
    }
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> AppCfg {
        let matches = build_app()
            .try_get_matches_from(std::iter::once("spot_crop").chain(args.iter().copied()))
            .unwrap();
        cfg_from_matches(Path::new("/work"), &matches)
    }

    #[test]
    fn test_every_arg_has_display_order() {
        //build_app panics if an argument was left out of DISPLAY_ORDERING
        build_app().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&[]);

        assert_eq!(cfg.dir_cfg.input_dir, PathBuf::from("/work/inputs"));
        assert_eq!(cfg.dir_cfg.output_dir, PathBuf::from("/work/cropped_spots"));
        assert_eq!(cfg.dir_cfg.temp_dir, PathBuf::from("/work/temp"));
        assert_eq!(cfg.dir_cfg.extensions, vec!["jpg", "png", "jpeg", "bmp"]);

        assert_eq!(cfg.detection, DetectionOptions::default());

        assert_eq!(cfg.output_cfg.format, OutputFormat::Normal);
        assert_eq!(cfg.output_cfg.verbosity, ReportVerbosity::Default);
        assert!(cfg.output_cfg.debug_images);
    }

    #[test]
    fn test_overrides() {
        let cfg = parse(&[
            "--input-dir",
            "/photos",
            "--output-dir",
            "crops",
            "--extensions",
            "PNG,.tif",
            "--threshold",
            "60",
            "--min-area",
            "5",
            "--max-area",
            "500",
            "--crop-height",
            "320",
            "--connectivity",
            "four",
            "--blur-kernel",
            "3",
            "--blur-sigma",
            "1.5",
            "--no-debug-images",
            "--output-format",
            "json",
            "--verbose",
        ]);

        assert_eq!(cfg.dir_cfg.input_dir, PathBuf::from("/photos"));
        assert_eq!(cfg.dir_cfg.output_dir, PathBuf::from("/work/crops"));
        assert_eq!(cfg.dir_cfg.extensions, vec!["PNG", "tif"]);

        let exp = DetectionOptions {
            threshold: 60,
            min_area: 5,
            max_area: 500,
            crop_height: 320,
            blur_kernel_size: 3,
            blur_sigma: 1.5,
            connectivity: Connectivity::Four,
        };
        assert_eq!(cfg.detection, exp);

        assert_eq!(cfg.output_cfg.format, OutputFormat::Json);
        assert_eq!(cfg.output_cfg.verbosity, ReportVerbosity::Verbose);
        assert!(!cfg.output_cfg.debug_images);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let res = build_app().try_get_matches_from(["spot_crop", "--quiet", "--verbose"]);
        assert!(res.is_err());

        assert_eq!(parse(&["--quiet"]).output_cfg.verbosity, ReportVerbosity::Quiet);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(build_app()
            .try_get_matches_from(["spot_crop", "--threshold", "256"])
            .is_err());
        assert!(build_app()
            .try_get_matches_from(["spot_crop", "--crop-height", "0"])
            .is_err());
    }
}
