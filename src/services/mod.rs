// ============================================================================
// 业务层：纯 Rust 核心逻辑
// ✅ 特点：不依赖命令行层，保持纯净，方便写 #[test]
// ⛔ 禁止：直接打印到 stdout（统一走 log 宏，输出由 commands 层负责）
// ============================================================================

pub mod batch;
pub mod classifier;
pub mod executor;
pub mod intention;
pub mod pattern_learner;
pub mod pipeline;
pub mod planner;
pub mod relationship;
pub mod report;
pub mod scanner;
pub mod template_registry;

// ============================================================================
// 常量定义
// ============================================================================

/// 默认排除模式：条目名包含其中任一子串即跳过
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".mp4",
    ".mov",
    ".png",
    ".next",
    ".DS_Store",
    ".env",
    "coverage",
    ".nyc_output",
    ".cache",
    "tmp",
    "temp",
];

/// 模式学习的复杂度阈值（严格大于）
pub const LEARNING_THRESHOLD: usize = 50;

/// 默认并发数上限
pub const MAX_WORKERS: usize = 8;

/// Markdown 报告文件名（写入主根目录）
pub const REPORT_MARKDOWN: &str = "ARCHITECTURE_ANALYSIS_REPORT.md";

/// JSON 报告文件名（写入主根目录）
pub const REPORT_JSON: &str = "architecture-analysis.json";

/// 关系映射比较次数超过该值时记录警告
pub const RELATIONSHIP_SCALE_WARNING: usize = 4_000_000;
