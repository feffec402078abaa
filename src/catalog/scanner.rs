use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One discovered message file, before any parsing.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub file_path: PathBuf,
    /// Containing folder, as stored in the `Path` column.
    pub folder: String,
    /// Bare file name, used for the pre-filter key.
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extension to match, without the dot (case-insensitive).
    pub extension: String,
    /// Paths longer than this (in characters) are skipped with a
    /// diagnostic rather than failing the scan.
    pub max_path_len: usize,
}

/// Lazily enumerate candidate message files under `root`, recursively.
///
/// Unreadable entries and over-length paths produce a diagnostic line and
/// are excluded; they never abort the walk.
pub fn scan(root: &Path, opts: &ScanOptions) -> impl Iterator<Item = Candidate> {
    let extension = opts.extension.to_ascii_lowercase();
    let max_path_len = opts.max_path_len;

    WalkDir::new(root).into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("scan warning: {err}");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }

        let path = entry.into_path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&extension));
        if !matches_extension {
            return None;
        }

        let rendered = path.to_string_lossy();
        if rendered.chars().count() > max_path_len {
            eprintln!("skipping file with long path: {rendered}");
            return None;
        }

        let folder = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Candidate {
            file_path: path,
            folder,
            file_name,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn options(extension: &str, max_path_len: usize) -> ScanOptions {
        ScanOptions {
            extension: extension.to_string(),
            max_path_len,
        }
    }

    #[test]
    fn finds_matching_files_recursively() {
        let tmp = tempdir().expect("tempdir");
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(tmp.path().join("top.eml"), "x").expect("write");
        fs::write(nested.join("deep.eml"), "x").expect("write");
        fs::write(nested.join("ignored.txt"), "x").expect("write");

        let mut names: Vec<String> = scan(tmp.path(), &options("eml", 4096))
            .map(|c| c.file_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["deep.eml", "top.eml"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("shouty.EML"), "x").expect("write");

        let found: Vec<Candidate> = scan(tmp.path(), &options("eml", 4096)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name, "shouty.EML");
    }

    #[test]
    fn over_length_paths_are_skipped_not_fatal() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("short.eml"), "x").expect("write");
        let long_name = format!("{}.eml", "x".repeat(120));
        fs::write(tmp.path().join(&long_name), "x").expect("write");

        let limit = tmp.path().join("short.eml").to_string_lossy().chars().count();
        let found: Vec<Candidate> = scan(tmp.path(), &options("eml", limit)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name, "short.eml");
    }

    #[test]
    fn candidate_folder_is_the_containing_directory() {
        let tmp = tempdir().expect("tempdir");
        let sub = tmp.path().join("inbox");
        fs::create_dir_all(&sub).expect("mkdir");
        fs::write(sub.join("one.eml"), "x").expect("write");

        let found: Vec<Candidate> = scan(tmp.path(), &options("eml", 4096)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].folder, sub.display().to_string());
    }

    #[test]
    fn missing_root_yields_no_candidates() {
        let tmp = tempdir().expect("tempdir");
        let found: Vec<Candidate> =
            scan(&tmp.path().join("absent"), &options("eml", 4096)).collect();
        assert!(found.is_empty());
    }
}
