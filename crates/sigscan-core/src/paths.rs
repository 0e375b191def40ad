//! 源路径解析：主目录占位符替换 + 文件/目录判定 + 递归枚举
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ConfigError, ScanError};

/// 代表当前用户主目录的占位符（不区分大小写）
pub const HOME_PLACEHOLDER: &str = "%userprofile%";

#[derive(Debug)]
pub(crate) struct PathResolver {
    placeholder: Regex,
    home: Option<PathBuf>,
    follow_links: bool,
}

impl PathResolver {
    pub(crate) fn new(home: Option<PathBuf>, follow_links: bool) -> Result<Self, ConfigError> {
        let placeholder = Regex::new(&format!("(?i){}", regex::escape(HOME_PLACEHOLDER)))?;
        Ok(Self { placeholder, home, follow_links })
    }

    /// 替换占位符；源中没有占位符时原样返回
    pub(crate) fn expand(&self, source: &str) -> Result<String, ScanError> {
        if !self.placeholder.is_match(source) {
            return Ok(source.to_string());
        }
        let home = self
            .home
            .as_deref()
            .ok_or_else(|| ScanError::HomeDirUnknown(source.to_string()))?;
        let home = home.to_string_lossy();
        Ok(self.placeholder.replace_all(source, NoExpand(&*home)).into_owned())
    }

    /// 把源路径解析为待扫描文件列表（绝对路径，目录下为无序递归结果）
    pub(crate) fn resolve(&self, source: &str) -> Result<Vec<PathBuf>, ScanError> {
        if source.trim().is_empty() {
            return Err(ScanError::EmptyPath);
        }
        let expanded = self.expand(source)?;
        let path = std::path::absolute(&expanded)
            .map_err(|_| ScanError::InvalidPath(expanded.clone()))?;
        let meta = std::fs::metadata(&path).map_err(|_| ScanError::InvalidPath(expanded.clone()))?;

        if meta.is_file() {
            Ok(vec![path])
        } else if meta.is_dir() {
            self.enumerate(&path)
        } else {
            Err(ScanError::InvalidPath(expanded))
        }
    }

    // 任一条目出错都视为整个目录不可扫描
    fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(self.follow_links) {
            let entry = entry.map_err(|source| ScanError::Enumerate { path: root.to_path_buf(), source })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver() -> PathResolver {
        PathResolver::new(Some(PathBuf::from("/home/tester")), false).unwrap()
    }

    #[test]
    fn test_expand_placeholder() {
        let r = resolver();
        assert_eq!(r.expand("%userprofile%/Documents").unwrap(), "/home/tester/Documents");
        assert_eq!(r.expand("%USERPROFILE%/a").unwrap(), "/home/tester/a");
        assert_eq!(r.expand("/var/data").unwrap(), "/var/data");
    }

    #[test]
    fn test_expand_without_home() {
        let r = PathResolver::new(None, false).unwrap();
        assert!(matches!(r.expand("%userprofile%"), Err(ScanError::HomeDirUnknown(_))));
        assert_eq!(r.expand("/plain").unwrap(), "/plain");
    }

    #[test]
    fn test_empty_source() {
        assert!(matches!(resolver().resolve(""), Err(ScanError::EmptyPath)));
        assert!(matches!(resolver().resolve("   "), Err(ScanError::EmptyPath)));
    }

    #[test]
    fn test_missing_source_is_invalid() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = resolver().resolve(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPath(_)));
    }

    #[test]
    fn test_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let files = resolver().resolve(file.to_str().unwrap()).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_directory_is_recursive_and_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        std::fs::write(dir.path().join("top.txt"), "x").unwrap();
        std::fs::write(dir.path().join("a/mid.js"), "x").unwrap();
        std::fs::write(dir.path().join("a/b/c/deep.bat"), "x").unwrap();

        let mut files = resolver().resolve(dir.path().to_str().unwrap()).unwrap();
        files.sort();
        let mut expected = vec![
            dir.path().join("top.txt"),
            dir.path().join("a/mid.js"),
            dir.path().join("a/b/c/deep.bat"),
        ];
        expected.sort();
        assert_eq!(files, expected);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_home_placeholder_resolves_into_home() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("notes.txt"), "x").unwrap();
        let r = PathResolver::new(Some(home.path().to_path_buf()), false).unwrap();
        let files = r.resolve("%userprofile%/notes.txt").unwrap();
        assert_eq!(files, vec![home.path().join("notes.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_skipped_in_dir_but_scanned_at_top_level() {
        let target_dir = TempDir::new().unwrap();
        let target = target_dir.path().join("real.txt");
        std::fs::write(&target, "x").unwrap();

        let dir = TempDir::new().unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        std::fs::write(dir.path().join("plain.txt"), "x").unwrap();

        // 不跟随链接时，目录枚举只包含普通文件
        let files = resolver().resolve(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(files, vec![dir.path().join("plain.txt")]);

        // 直接给出的链接路径按文件扫描
        let files = resolver().resolve(link.to_str().unwrap()).unwrap();
        assert_eq!(files, vec![link]);
    }
}
