// ============================================================================
// 扫描服务：遍历根目录，分析每个文件并划入内容表或骨架表
// 每个目录先分批并发分析自身的文件，整批 join 之后才递归进入子目录
// 符号链接一律不跟随；已访问的规范化目录不会重复扫描
// ============================================================================

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::models::config::CompletionConfig;
use crate::models::dtos::FileRecord;
use crate::services::batch::BatchRunner;
use crate::services::classifier::Classifier;
use crate::utils::error::{AppError, AppResult};
use crate::utils::path;

/// 扫描结果：内容表与骨架表互斥，键为相对路径
#[derive(Debug, Default)]
pub struct ScanResult {
    pub content: BTreeMap<String, FileRecord>,
    pub skeleton: BTreeMap<String, FileRecord>,
    pub directories_skipped: usize,
    pub files_failed: usize,
    pub batches: usize,
}

impl ScanResult {
    pub fn files_processed(&self) -> usize {
        self.content.len() + self.skeleton.len()
    }

    fn insert(&mut self, record: FileRecord) {
        if record.has_content() {
            self.content.insert(record.relative_path.clone(), record);
        } else {
            self.skeleton.insert(record.relative_path.clone(), record);
        }
    }
}

/// 待分析的文件：绝对路径 + 表键
struct PendingFile {
    path: PathBuf,
    relative_path: String,
}

/// 目录扫描器
pub struct Scanner<'a> {
    config: &'a CompletionConfig,
    classifier: &'a Classifier,
    runner: &'a BatchRunner,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a CompletionConfig, classifier: &'a Classifier, runner: &'a BatchRunner) -> Self {
        Self {
            config,
            classifier,
            runner,
        }
    }

    /// 扫描全部根目录
    ///
    /// 第一个根目录的记录以相对路径为键，其余根目录的键带上该根目录名作为前缀。
    /// 不存在的根目录只记录警告。
    pub fn scan_roots(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let mut visited: HashSet<PathBuf> = HashSet::new();

        for (index, root) in self.config.roots.iter().enumerate() {
            if !root.is_dir() {
                log::warn!("根目录不存在或不是目录，已跳过：{}", root.display());
                continue;
            }

            let prefix = if index == 0 {
                String::new()
            } else {
                root_prefix(root)
            };

            log::info!("开始扫描：{}", root.display());
            self.scan_directory(root, &prefix, &mut visited, &mut result);
        }

        log::info!(
            "扫描完成：内容文件 {} 个，骨架文件 {} 个，跳过目录 {} 个，失败文件 {} 个",
            result.content.len(),
            result.skeleton.len(),
            result.directories_skipped,
            result.files_failed
        );
        result
    }

    fn scan_directory(
        &self,
        dir: &Path,
        relative_dir: &str,
        visited: &mut HashSet<PathBuf>,
        result: &mut ScanResult,
    ) {
        match std::fs::canonicalize(dir) {
            Ok(canonical) => {
                if !visited.insert(canonical) {
                    log::debug!("目录已扫描过，跳过：{}", dir.display());
                    return;
                }
            }
            Err(e) => {
                log::warn!("无法解析目录 {}：{}", dir.display(), e);
                result.directories_skipped += 1;
                return;
            }
        }

        let mut files = Vec::new();
        let mut subdirs = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    log::warn!("无法读取目录 {}：{}", dir.display(), e);
                    result.directories_skipped += 1;
                    return;
                }
                Err(e) => {
                    log::warn!("目录 {} 中的条目读取失败：{}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if self.config.should_skip(&name) {
                continue;
            }

            let relative_path = path::join_relative(relative_dir, &name);
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                log::debug!("不跟随符号链接：{}", relative_path);
            } else if file_type.is_dir() {
                subdirs.push(PendingFile {
                    path: entry.into_path(),
                    relative_path,
                });
            } else if file_type.is_file() {
                files.push(PendingFile {
                    path: entry.into_path(),
                    relative_path,
                });
            }
        }

        let (analyzed, batches) = self.runner.run(&files, |file| {
            analyze_file(&file.path, &file.relative_path, self.classifier)
        });
        result.batches += batches;

        for outcome in analyzed {
            match outcome {
                Ok(record) => result.insert(record),
                Err(e) => {
                    log::warn!("{}", e);
                    result.files_failed += 1;
                }
            }
        }

        for subdir in subdirs {
            self.scan_directory(&subdir.path, &subdir.relative_path, visited, result);
        }
    }
}

/// 附加根目录的键前缀（根目录名）
fn root_prefix(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path::to_slash(root).trim_matches('/').replace('/', "_"))
}

/// 读取并分类单个文件；字节数为 0 的文件是骨架文件，不读取内容
pub fn analyze_file(file_path: &Path, relative_path: &str, classifier: &Classifier) -> AppResult<FileRecord> {
    let meta = std::fs::metadata(file_path)
        .map_err(|e| AppError::ScanError(format!("无法读取文件信息 {}：{}", relative_path, e)))?;

    let size = meta.len();
    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (content, content_hash) = if size > 0 {
        let bytes = std::fs::read(file_path)
            .map_err(|e| AppError::ScanError(format!("无法读取文件 {}：{}", relative_path, e)))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        (String::from_utf8_lossy(&bytes).into_owned(), Some(hash))
    } else {
        (String::new(), None)
    };

    let classification = classifier.classify(relative_path, &content);

    Ok(FileRecord {
        path: file_path.to_path_buf(),
        relative_path: relative_path.to_string(),
        size,
        modified,
        extension: path::extension(relative_path).to_string(),
        directory: path::directory(relative_path).to_string(),
        content,
        content_hash,
        category: classification.category,
        complexity: classification.complexity,
        dependencies: classification.dependencies,
        exports: classification.exports,
        patterns: classification.patterns,
        compliance: classification.compliance,
    })
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative_path: &str, content: &str) {
        let full = root.join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    fn scan(config: &CompletionConfig) -> ScanResult {
        let classifier = Classifier::new().unwrap();
        let runner = BatchRunner::new(config.workers).unwrap();
        Scanner::new(config, &classifier, &runner).scan_roots()
    }

    #[test]
    fn test_partitions_content_and_skeleton() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tokens/spacing.ts", "export const spacing = { sm: '4px' };");
        write(dir.path(), "tokens/colors.ts", "");
        write(dir.path(), "index.ts", "");

        let mut config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        config.workers = 2;
        let result = scan(&config);

        assert_eq!(result.content.len(), 1);
        assert_eq!(result.skeleton.len(), 2);
        assert!(result.skeleton.contains_key("tokens/colors.ts"));
        assert!(result.skeleton.contains_key("index.ts"));

        let spacing = &result.content["tokens/spacing.ts"];
        assert_eq!(spacing.directory, "tokens");
        assert_eq!(spacing.extension, ".ts");
        assert_eq!(spacing.content_hash.as_ref().map(|h| h.len()), Some(64));
        assert!(result.skeleton["index.ts"].content_hash.is_none());
    }

    #[test]
    fn test_excluded_and_hidden_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/pkg/index.js", "module.exports = 1;");
        write(dir.path(), ".hidden/secret.ts", "export const s = 1;");
        write(dir.path(), "assets/logo.png", "png");
        write(dir.path(), "src/app.ts", "export const app = 1;");

        let config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        let result = scan(&config);

        let keys: Vec<&String> = result.content.keys().collect();
        assert_eq!(keys, vec!["src/app.ts"]);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.ts", "export const a = 1;");

        let config = CompletionConfig::with_roots(vec![
            dir.path().join("does-not-exist"),
            dir.path().to_path_buf(),
        ]);
        let result = scan(&config);

        // 主根目录不存在时，第二个根目录的键仍带有前缀
        let prefix = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(result.content.contains_key(&format!("{}/a.ts", prefix)));
    }

    #[test]
    fn test_additional_roots_are_prefixed() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "a.ts", "export const a = 1;");
        write(second.path(), "b.ts", "");

        let config = CompletionConfig::with_roots(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let result = scan(&config);

        let prefix = second.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(result.content.contains_key("a.ts"));
        assert!(result.skeleton.contains_key(&format!("{}/b.ts", prefix)));
    }

    #[test]
    fn test_overlapping_roots_scan_each_directory_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/a.ts", "export const a = 1;");

        let config = CompletionConfig::with_roots(vec![dir.path().to_path_buf(), dir.path().join("lib")]);
        let result = scan(&config);

        assert_eq!(result.files_processed(), 1);
        assert!(result.content.contains_key("lib/a.ts"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycles_are_not_followed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/a.ts", "export const a = 1;");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("lib/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("lib/a.ts"), dir.path().join("lib/alias.ts")).unwrap();

        let config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        let result = scan(&config);

        assert_eq!(result.files_processed(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped_and_siblings_scanned() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "alpha/a.ts", "export const a = 1;");
        write(dir.path(), "vault/secret.ts", "export const s = 1;");
        write(dir.path(), "zeta/z.ts", "");

        let locked = dir.path().join("vault");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        // root 用户不受权限位限制，此时无法构造不可读目录
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        let result = scan(&config);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.directories_skipped, 1);
        assert!(result.content.contains_key("alpha/a.ts"));
        assert!(result.skeleton.contains_key("zeta/z.ts"));
        assert!(!result.content.contains_key("vault/secret.ts"));
        assert_eq!(result.files_processed(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_counted_and_omitted() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/ok.ts", "export const ok = 1;");
        write(dir.path(), "lib/locked.ts", "export const locked = 1;");

        let locked = dir.path().join("lib/locked.ts");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read(&locked).is_ok() {
            return;
        }

        let config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        let result = scan(&config);

        assert_eq!(result.files_failed, 1);
        assert!(result.content.contains_key("lib/ok.ts"));
        assert!(!result.content.contains_key("lib/locked.ts"));
        assert!(!result.skeleton.contains_key("lib/locked.ts"));
    }

    #[test]
    fn test_batches_counted_per_directory() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{}.ts", i), "");
        }
        write(dir.path(), "sub/g.ts", "");

        let mut config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        config.workers = 2;
        let result = scan(&config);

        // 根目录 5 个文件分 3 批，子目录 1 批
        assert_eq!(result.batches, 4);
        assert_eq!(result.skeleton.len(), 6);
    }

    #[test]
    fn test_analyze_file_binary_content_is_lossy() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("blob.bin");
        std::fs::write(&file, [0xff, 0xfe, 0x41]).unwrap();

        let classifier = Classifier::new().unwrap();
        let record = analyze_file(&file, "blob.bin", &classifier).unwrap();
        assert_eq!(record.size, 3);
        assert!(record.content.ends_with('A'));
    }

    #[test]
    fn test_analyze_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let classifier = Classifier::new().unwrap();
        assert!(analyze_file(&dir.path().join("gone.ts"), "gone.ts", &classifier).is_err());
    }
}
