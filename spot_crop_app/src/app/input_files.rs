use std::path::{Path, PathBuf};

use itertools::Itertools;
use spot_crop_lib::Error;

use crate::app::*;

/// List the images directly inside `dir` whose extension is one of `extensions`.
///
/// Files are grouped by extension, in the order the extensions are given, and sorted by file
/// name within each group. Extension matching is case sensitive. A file is listed at most once
/// even if its extension is given twice.
pub fn find_input_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, AppError> {
    if !dir.is_dir() {
        return Err(Error::InputDir {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        }
        .into());
    }

    let all_entries = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry.map_err(|e| Error::InputDir {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
        });

    let all_files = all_entries
        .filter_ok(|dir_entry| dir_entry.file_type().is_file())
        .map_ok(walkdir::DirEntry::into_path)
        .collect::<Result<Vec<_>, _>>()?;

    let has_extension = |path: &Path, ext: &str| {
        path.extension()
            .map(|file_ext| file_ext.to_string_lossy() == ext)
            .unwrap_or(false)
    };

    let ret = extensions
        .iter()
        .unique()
        .flat_map(|ext| {
            all_files
                .iter()
                .filter(move |path| has_extension(path, ext))
                .cloned()
        })
        .collect::<Vec<_>>();

    if ret.is_empty() {
        return Err(Error::NoInputFound(dir.to_path_buf()).into());
    }

    Ok(ret)
}

/// The name used for every artifact produced from `path`: its file name without the final
/// extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}
