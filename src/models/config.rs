// ============================================================================
// 运行配置
// 默认值 → JSON 配置文件 → 命令行参数，后者覆盖前者
// ============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::services::{DEFAULT_EXCLUDES, LEARNING_THRESHOLD, MAX_WORKERS};
use crate::utils::error::{AppError, AppResult};

/// 流水线配置
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CompletionConfig {
    /// 扫描根目录，第一个为主根目录（报告写入此处）
    pub roots: Vec<PathBuf>,
    /// 排除模式：条目名包含任一模式（子串匹配）即跳过；以 '.' 开头的条目总是跳过
    pub exclude_patterns: Vec<String>,
    /// 每批并发处理的条目数，同时也是线程池大小
    pub workers: usize,
    /// 参与模式学习的最低复杂度（严格大于）
    pub learning_threshold: usize,
    /// 是否生成架构报告
    pub write_reports: bool,
    /// 演练模式：只规划不写入
    pub dry_run: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            workers: default_workers(),
            learning_threshold: LEARNING_THRESHOLD,
            write_reports: true,
            dry_run: false,
        }
    }
}

/// 默认并发数：可用核数，上限 MAX_WORKERS
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_WORKERS)
}

impl CompletionConfig {
    /// 以指定根目录和默认值构造配置
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Self::default()
        }
    }

    /// 从 JSON 配置文件加载，缺省字段取默认值
    pub fn load_from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        let config: CompletionConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// 校验配置是否可用于一次运行
    pub fn validate(&self) -> AppResult<()> {
        if self.roots.is_empty() {
            return Err(AppError::ConfigError("至少需要一个扫描根目录".to_string()));
        }
        if self.workers == 0 {
            return Err(AppError::ConfigError("并发数必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 主根目录
    pub fn primary_root(&self) -> Option<&Path> {
        self.roots.first().map(|p| p.as_path())
    }

    /// 条目名是否应被跳过
    pub fn should_skip(&self, name: &str) -> bool {
        name.starts_with('.')
            || self
                .exclude_patterns
                .iter()
                .any(|pattern| name.contains(pattern.as_str()))
    }
}
