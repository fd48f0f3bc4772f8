//! Settings shared by split and combine runs.

use std::path::{Path, PathBuf};

use crate::block::KeywordMatch;

/// Explicit configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Destination for generated files. `None` means the current directory.
    pub outdir: Option<PathBuf>,
    /// Keyword comparison used when scanning for header boundaries.
    pub keyword_match: KeywordMatch,
}

impl Config {
    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn with_keyword_match(mut self, keyword_match: KeywordMatch) -> Self {
        self.keyword_match = keyword_match;
        self
    }

    /// Directory that generated files are written to.
    pub fn output_dir(&self) -> &Path {
        self.outdir.as_deref().unwrap_or(Path::new("."))
    }

    /// Full path of a generated file called `name`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_writes_to_current_directory() {
        let config = Config::default();
        assert_eq!(config.output_dir(), Path::new("."));
        assert_eq!(config.output_path("a.part_0"), PathBuf::from("./a.part_0"));
        assert_eq!(config.keyword_match, KeywordMatch::Prefix);
    }

    #[test]
    fn outdir_is_joined() {
        let config = Config::default()
            .with_outdir("out")
            .with_keyword_match(KeywordMatch::Exact);
        assert_eq!(config.output_path("a.part_map"), PathBuf::from("out/a.part_map"));
        assert_eq!(config.keyword_match, KeywordMatch::Exact);
    }
}
