//! Output path helpers.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `movie.xml` -> `movie.json`.
#[must_use]
pub fn json_output_path(cpix_path: &Path) -> PathBuf {
    cpix_path.with_extension("json")
}

/// `movie.xml` -> `movie_titanfile.xml`.
#[must_use]
pub fn titan_output_path(cpix_path: &Path) -> PathBuf {
    with_stem_suffix(cpix_path.with_extension(""), "_titanfile", Some("xml"))
}

/// `preset.kpreset` -> `preset_cpix.kpreset`.
#[must_use]
pub fn spliced_preset_output_path(preset_path: &Path) -> PathBuf {
    let extension = preset_path.extension().map(|e| e.to_os_string());
    with_stem_suffix(
        preset_path.with_extension(""),
        "_cpix",
        extension.as_deref().and_then(|e| e.to_str()),
    )
}

fn with_stem_suffix(base: PathBuf, suffix: &str, extension: Option<&str>) -> PathBuf {
    let mut name: OsString = base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
    }
    base.with_file_name(name)
}

/// Ensure a file path's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write a complete output file, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::{json_output_path, spliced_preset_output_path, titan_output_path};
    use std::path::{Path, PathBuf};

    #[test]
    fn json_path_replaces_extension() {
        assert_eq!(
            json_output_path(Path::new("/keys/movie.cpix.xml")),
            PathBuf::from("/keys/movie.cpix.json")
        );
    }

    #[test]
    fn titan_path_appends_suffix() {
        assert_eq!(
            titan_output_path(Path::new("/keys/movie.xml")),
            PathBuf::from("/keys/movie_titanfile.xml")
        );
        assert_eq!(
            titan_output_path(Path::new("movie")),
            PathBuf::from("movie_titanfile.xml")
        );
    }

    #[test]
    fn spliced_path_keeps_extension() {
        assert_eq!(
            spliced_preset_output_path(Path::new("presets/hevc.kpreset")),
            PathBuf::from("presets/hevc_cpix.kpreset")
        );
        assert_eq!(
            spliced_preset_output_path(Path::new("hevc")),
            PathBuf::from("hevc_cpix")
        );
    }
}
