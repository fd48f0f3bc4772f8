//! File naming for parts, maps, and reconstructed outputs.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, PathContext, Result};

/// Extension given to map files.
pub const MAP_EXTENSION: &str = "part_map";

/// Prefix of the numbered extension given to part files.
pub const PART_PREFIX: &str = "part_";

/// Returns the file name of `path` with its last extension removed.
///
/// `data/m31.fits` becomes `m31`; a name without an extension is returned
/// as-is. The stem must be valid UTF-8 because it is written into map files.
pub fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

/// Returns the stem of `source` for naming its parts and map.
///
/// Map lines are split on whitespace and at the last colon, so a stem
/// containing either could not be read back.
pub fn part_stem(source: &Path) -> Result<&str> {
    let stem = file_stem(source)?;
    if stem.contains(':') || stem.contains(char::is_whitespace) {
        return Err(Error::InvalidPath(source.to_path_buf()));
    }
    Ok(stem)
}

/// Fails with [`Error::OverwritesSource`] if any of `outputs` is the same
/// file as `source`.
pub fn ensure_distinct_from_source<P: AsRef<Path>>(source: &Path, outputs: &[P]) -> Result<()> {
    let source = fs::canonicalize(source).with_path(source)?;
    for output in outputs.iter().map(AsRef::as_ref) {
        if output.exists() && fs::canonicalize(output).with_path(output)? == source {
            return Err(Error::OverwritesSource(output.to_path_buf()));
        }
    }
    Ok(())
}

/// Name of part `number` for a source with the given stem.
pub fn part_file_name(stem: &str, number: usize) -> String {
    format!("{stem}.{PART_PREFIX}{number}")
}

/// Name of the map file for a source with the given stem.
pub fn map_file_name(stem: &str) -> String {
    format!("{stem}.{MAP_EXTENSION}")
}

/// Returns `true` if `name` is a bare file name that stays inside the
/// directory it is joined onto.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Directory that relative names inside the map file at `map_path` resolve
/// against.
pub fn map_directory(map_path: &Path) -> PathBuf {
    match map_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Checks that every input exists, reporting all missing paths at once.
pub fn ensure_inputs_exist<P: AsRef<Path>>(inputs: &[P]) -> Result<()> {
    let missing: Vec<PathBuf> = inputs
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.exists())
        .map(Path::to_path_buf)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingInputs(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_last_extension() {
        assert_eq!(file_stem(Path::new("data/m31.fits")).unwrap(), "m31");
        assert_eq!(file_stem(Path::new("a.tar.fits")).unwrap(), "a.tar");
        assert_eq!(file_stem(Path::new("noext")).unwrap(), "noext");
    }

    #[test]
    fn stem_of_map_file() {
        assert_eq!(file_stem(Path::new("out/m31.part_map")).unwrap(), "m31");
    }

    #[test]
    fn stem_rejects_pathless_input() {
        assert!(matches!(
            file_stem(Path::new("..")),
            Err(Error::InvalidPath(_))
        ));
        assert!(file_stem(Path::new("/")).is_err());
    }

    #[test]
    fn part_stem_rejects_map_separators() {
        assert_eq!(part_stem(Path::new("obs-2024.fits")).unwrap(), "obs-2024");
        assert!(matches!(
            part_stem(Path::new("obs:2024.fits")),
            Err(Error::InvalidPath(_))
        ));
        assert!(part_stem(Path::new("my obs.fits")).is_err());
    }

    #[test]
    fn outputs_must_differ_from_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("x.part_0");
        std::fs::write(&source, b"data").unwrap();
        let sibling = dir.path().join("x.part_1");
        let aliased = dir.path().join(".").join("x.part_0");

        ensure_distinct_from_source(&source, &[&sibling]).unwrap();
        match ensure_distinct_from_source(&source, &[&sibling, &aliased]) {
            Err(Error::OverwritesSource(path)) => assert_eq!(path, aliased),
            other => panic!("Expected OverwritesSource, got {:?}", other),
        }
    }

    #[test]
    fn part_and_map_names() {
        assert_eq!(part_file_name("m31", 0), "m31.part_0");
        assert_eq!(part_file_name("m31", 12), "m31.part_12");
        assert_eq!(map_file_name("m31"), "m31.part_map");
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("m31.part_0"));
        assert!(!is_plain_file_name("../m31.part_0"));
        assert!(!is_plain_file_name("sub/m31.part_0"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(""));
    }

    #[test]
    fn map_directory_defaults_to_current() {
        assert_eq!(map_directory(Path::new("x.part_map")), PathBuf::from("."));
        assert_eq!(
            map_directory(Path::new("out/x.part_map")),
            PathBuf::from("out")
        );
    }

    #[test]
    fn missing_inputs_are_aggregated() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("here.fits");
        std::fs::write(&present, b"x").unwrap();
        let gone_a = dir.path().join("a.fits");
        let gone_b = dir.path().join("b.fits");

        ensure_inputs_exist(&[&present]).unwrap();
        match ensure_inputs_exist(&[&gone_a, &present, &gone_b]) {
            Err(Error::MissingInputs(paths)) => assert_eq!(paths, vec![gone_a.clone(), gone_b.clone()]),
            other => panic!("Expected MissingInputs, got {:?}", other),
        }
    }
}
