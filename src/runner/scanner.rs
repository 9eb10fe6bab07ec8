use std::fs;
use std::path::Path;

use tracing::debug;

use crate::descriptor::Backend;
use crate::runner::types::{Direction, SeedFile};
use crate::{ReseedError, Result};

/// 列出 `dir` 中某个方向的 seed 文件
///
/// 按文件名排序，`Down` 倒序返回，这样回滚按相反顺序撤销。
/// 目录和其他后缀的文件会被忽略。
pub fn discover(dir: &Path, direction: Direction, backend: Backend) -> Result<Vec<SeedFile>> {
    let suffix = direction.suffix(backend);
    let entries = fs::read_dir(dir).map_err(|e| ReseedError::file_system(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReseedError::file_system(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| ReseedError::file_system(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
            continue;
        };
        if name.ends_with(&suffix) {
            files.push(SeedFile {
                name,
                path: entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    if direction == Direction::Down {
        files.reverse();
    }

    debug!(dir = %dir.display(), suffix = %suffix, count = files.len(), "seed files discovered");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(files: &[SeedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    fn seed_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in [
            "0002_data.up.json",
            "0001_init.up.json",
            "0001_init.down.json",
            "0002_data.down.json",
            "0003_metrics.up.txt",
            "README.md",
            "0004_notes.up.json.bak",
        ] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }
        fs::create_dir(dir.path().join("0005_dir.up.json")).unwrap();
        dir
    }

    #[test]
    fn test_up_ascending() {
        let dir = seed_dir();
        let files = discover(dir.path(), Direction::Up, Backend::Http).unwrap();
        assert_eq!(names(&files), vec!["0001_init.up.json", "0002_data.up.json"]);
    }

    #[test]
    fn test_down_descending() {
        let dir = seed_dir();
        let files = discover(dir.path(), Direction::Down, Backend::Elasticsearch).unwrap();
        assert_eq!(names(&files), vec!["0002_data.down.json", "0001_init.down.json"]);
    }

    #[test]
    fn test_influx_uses_txt() {
        let dir = seed_dir();
        let files = discover(dir.path(), Direction::Up, Backend::Influx).unwrap();
        assert_eq!(names(&files), vec!["0003_metrics.up.txt"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), Direction::Up, Backend::Http).unwrap_err();
        assert!(matches!(err, ReseedError::FileSystemError { .. }));
    }
}
