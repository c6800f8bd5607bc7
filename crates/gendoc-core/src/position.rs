use std::path::{Path, PathBuf};

/// Where the scanner currently is: the file being read and the 1-based line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
}

impl Position {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Resolves a path written inside the current file against that file's directory.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if self.file.as_os_str().is_empty() || relative.is_absolute() {
            return relative.to_path_buf();
        }
        match self.file.parent() {
            Some(dir) => dir.join(relative),
            None => relative.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_current_file() {
        let position = Position::new("docs/manual/index.xml", 3);
        assert_eq!(
            position.resolve("img/logo.png"),
            PathBuf::from("docs/manual/img/logo.png")
        );
        assert_eq!(Position::new("index.xml", 1).resolve("a.xml"), PathBuf::from("a.xml"));
        assert_eq!(Position::default().resolve("a.xml"), PathBuf::from("a.xml"));
    }
}
