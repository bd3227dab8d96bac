// ============================================================================
// 数据传输对象（DTO）定义
// 流水线各阶段之间传递的数据结构，仅包含字段定义、序列化派生和简单访问器
// ⛔ 禁止：包含复杂的业务逻辑方法
// ============================================================================

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::path;

// ============================================================================
// 优先级
// ============================================================================

/// 补全优先级，派生的 `Ord` 顺序即为优先级高低（Low < Medium < High < Critical）
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
    Critical,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
            Tier::Critical => "critical",
        }
    }

    /// 将优先级至少提升到 `floor`，永不降低
    pub fn raise_to(self, floor: Tier) -> Tier {
        self.max(floor)
    }
}

// ============================================================================
// 文件分类
// ============================================================================

/// 内容文件分类，由分类规则表按固定顺序首个命中决定
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Design Token Types")]
    DesignTokenTypes,
    #[serde(rename = "Design Token Definitions")]
    DesignTokenDefinitions,
    #[serde(rename = "Token System")]
    TokenSystem,
    #[serde(rename = "React Component")]
    ReactComponent,
    #[serde(rename = "Code Connect Component")]
    CodeConnectComponent,
    #[serde(rename = "Component Definition")]
    ComponentDefinition,
    #[serde(rename = "SCSS System")]
    ScssSystem,
    #[serde(rename = "CSS Variables")]
    CssVariables,
    #[serde(rename = "Glass Effect Styles")]
    GlassEffectStyles,
    #[serde(rename = "Style System")]
    StyleSystem,
    #[serde(rename = "Icon/SVG Asset")]
    IconAsset,
    #[serde(rename = "Code Connect Integration")]
    CodeConnectIntegration,
    #[serde(rename = "Figma Integration")]
    FigmaIntegration,
    #[serde(rename = "Utility System")]
    UtilitySystem,
    #[serde(rename = "Validation System")]
    ValidationSystem,
    #[serde(rename = "Build System")]
    BuildSystem,
    #[serde(rename = "Foundation Pattern")]
    FoundationPattern,
    #[serde(rename = "Export Index")]
    ExportIndex,
    #[serde(rename = "Theme System")]
    ThemeSystem,
    #[serde(rename = "Brand System")]
    BrandSystem,
    #[serde(rename = "System Component")]
    SystemComponent,
}

impl Category {
    /// 人类可读的分类名称（模式族按该名称的子串归类）
    pub fn label(&self) -> &'static str {
        match self {
            Category::DesignTokenTypes => "Design Token Types",
            Category::DesignTokenDefinitions => "Design Token Definitions",
            Category::TokenSystem => "Token System",
            Category::ReactComponent => "React Component",
            Category::CodeConnectComponent => "Code Connect Component",
            Category::ComponentDefinition => "Component Definition",
            Category::ScssSystem => "SCSS System",
            Category::CssVariables => "CSS Variables",
            Category::GlassEffectStyles => "Glass Effect Styles",
            Category::StyleSystem => "Style System",
            Category::IconAsset => "Icon/SVG Asset",
            Category::CodeConnectIntegration => "Code Connect Integration",
            Category::FigmaIntegration => "Figma Integration",
            Category::UtilitySystem => "Utility System",
            Category::ValidationSystem => "Validation System",
            Category::BuildSystem => "Build System",
            Category::FoundationPattern => "Foundation Pattern",
            Category::ExportIndex => "Export Index",
            Category::ThemeSystem => "Theme System",
            Category::BrandSystem => "Brand System",
            Category::SystemComponent => "System Component",
        }
    }
}

// ============================================================================
// 文件记录
// ============================================================================

/// 复杂度指标（固定权重，不可调）
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ComplexityMetrics {
    pub lines: usize,
    pub functions: usize,
    pub interfaces: usize,
    pub imports: usize,
    pub exports: usize,
    /// lines + 2×functions + 3×interfaces + imports + exports
    pub score: usize,
}

/// 合规检查结果：得分与通过的检查项
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ComplianceReport {
    pub score: u32,
    pub checks: Vec<String>,
    pub max_score: u32,
}

/// 单个文件的扫描与分类结果，扫描后不再修改
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileRecord {
    /// 文件的绝对路径
    pub path: PathBuf,
    /// 表键：正斜杠分隔的相对路径
    pub relative_path: String,
    /// 扫描时的字节数；为 0 即为骨架文件
    pub size: u64,
    /// 修改时间（Unix 秒）
    pub modified: u64,
    /// 扩展名（含前导点）
    pub extension: String,
    /// 所在目录的相对路径
    pub directory: String,
    /// 文件全文，骨架文件为空；不进入 JSON 报告
    #[serde(skip)]
    pub content: String,
    /// 内容的 SHA256（十六进制），仅内容文件有值
    pub content_hash: Option<String>,
    pub category: Category,
    pub complexity: ComplexityMetrics,
    pub dependencies: Vec<String>,
    pub exports: Vec<String>,
    pub patterns: Vec<String>,
    pub compliance: ComplianceReport,
}

impl FileRecord {
    /// 是否为内容文件（扫描时字节数大于 0）
    pub fn has_content(&self) -> bool {
        self.size > 0
    }

    /// 去掉扩展名的文件名
    pub fn base_name(&self) -> &str {
        path::base_name(&self.relative_path)
    }
}

// ============================================================================
// 意图推断
// ============================================================================

/// 骨架文件的推断用途
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    ExportAggregator,
    TokenSystem,
    ComponentDefinition,
    IconComponent,
    UtilityFunctions,
    ValidationSystem,
    StylingSystem,
    ExternalIntegration,
    Unknown,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::ExportAggregator => "export-aggregator",
            Purpose::TokenSystem => "token-system",
            Purpose::ComponentDefinition => "component-definition",
            Purpose::IconComponent => "icon-component",
            Purpose::UtilityFunctions => "utility-functions",
            Purpose::ValidationSystem => "validation-system",
            Purpose::StylingSystem => "styling-system",
            Purpose::ExternalIntegration => "external-integration",
            Purpose::Unknown => "unknown",
        }
    }
}

/// 骨架文件的推断意图，每个骨架文件恰好一个
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Intention {
    pub purpose: Purpose,
    pub tier: Tier,
    pub template_suggestion: String,
    pub expected_exports: Vec<String>,
    /// 相关内容文件的相对路径
    pub related_files: Vec<String>,
    /// 固定置信度（0-100）
    pub confidence: u32,
}

impl Default for Intention {
    fn default() -> Self {
        Self {
            purpose: Purpose::Unknown,
            tier: Tier::Medium,
            template_suggestion: "basic".to_string(),
            expected_exports: Vec::new(),
            related_files: Vec::new(),
            confidence: 0,
        }
    }
}

// ============================================================================
// 关系映射
// ============================================================================

/// 内容文件的关系边（启发式，多对多）
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationshipEdge {
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    /// 导入了本文件的其他内容文件
    pub dependents: Vec<String>,
    /// 意图中把本文件列为相关文件的骨架文件
    pub related_skeleton: Vec<String>,
}

// ============================================================================
// 补全计划
// ============================================================================

/// 补全计划条目
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlanEntry {
    pub relative_path: String,
    pub record: FileRecord,
    pub intention: Intention,
    /// 综合得分
    pub score: u32,
    /// 加分规则提升后的最终优先级
    pub tier: Tier,
    /// 解析出的模板 id（可能没有对应的生成器）
    pub template_id: String,
    pub dependencies: Vec<String>,
}

/// 补全阶段，固定 4 个（critical/high/medium/low）
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Phase {
    pub name: String,
    pub tier: Tier,
    pub entries: Vec<PlanEntry>,
}

/// 排序后的完整计划
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CompletionPlan {
    /// 全局排序结果（执行顺序）
    pub ranked: Vec<PlanEntry>,
    pub phases: Vec<Phase>,
}

impl CompletionPlan {
    /// 指定优先级的条目数量
    pub fn count_by_tier(&self, tier: Tier) -> usize {
        self.ranked.iter().filter(|e| e.tier == tier).count()
    }
}

// ============================================================================
// 执行结果
// ============================================================================

/// 单个条目的执行结果
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ExecutionOutcome {
    /// 已写入模板内容
    Completed,
    /// 演练模式：本应写入
    Planned,
    /// 目标已有内容，跳过
    SkippedExists,
    /// 模板 id 未注册，跳过
    SkippedNoTemplate,
    /// 写入失败
    Failed { reason: String },
}

/// 单个条目的执行记录
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExecutionRecord {
    pub relative_path: String,
    pub template_id: String,
    pub tier: Tier,
    pub outcome: ExecutionOutcome,
}

/// 执行汇总
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExecutionSummary {
    pub records: Vec<ExecutionRecord>,
    pub completed: usize,
    pub planned: usize,
    pub skipped_exists: usize,
    pub skipped_no_template: usize,
    pub failed: usize,
}

impl ExecutionSummary {
    /// 记录一个结果并更新计数
    pub fn push(&mut self, record: ExecutionRecord) {
        match record.outcome {
            ExecutionOutcome::Completed => self.completed += 1,
            ExecutionOutcome::Planned => self.planned += 1,
            ExecutionOutcome::SkippedExists => self.skipped_exists += 1,
            ExecutionOutcome::SkippedNoTemplate => self.skipped_no_template += 1,
            ExecutionOutcome::Failed { .. } => self.failed += 1,
        }
        self.records.push(record);
    }

    /// 跳过总数（已有内容 + 无模板）
    pub fn skipped(&self) -> usize {
        self.skipped_exists + self.skipped_no_template
    }

    /// 成功率（百分比，四舍五入）；没有尝试写入的条目时为 None
    pub fn success_rate(&self) -> Option<u32> {
        let total = self.completed + self.failed + self.skipped_exists;
        if total == 0 {
            return None;
        }
        Some(((self.completed as f64 / total as f64) * 100.0).round() as u32)
    }
}

// ============================================================================
// 运行统计
// ============================================================================

/// 整次运行的统计数据（各阶段耗时单位为毫秒）
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RunStats {
    pub files_processed: usize,
    pub parallel_batches: usize,
    pub directories_skipped: usize,
    pub files_failed: usize,
    pub scan_ms: u128,
    pub learn_ms: u128,
    pub infer_ms: u128,
    pub map_ms: u128,
    pub plan_ms: u128,
    pub execute_ms: u128,
    pub total_ms: u128,
}

impl RunStats {
    /// 每秒处理的文件数
    pub fn files_per_second(&self) -> f64 {
        if self.total_ms == 0 {
            return self.files_processed as f64;
        }
        self.files_processed as f64 / (self.total_ms as f64 / 1000.0)
    }
}

// ============================================================================
// 命令层输出
// ============================================================================

/// 计划中的单个文件（命令行输出用）
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlannedFile {
    pub relative_path: String,
    pub tier: Tier,
    pub score: u32,
    pub template_id: String,
}

/// 一次运行的摘要，命令层以文本或 JSON 输出
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RunSummary {
    /// "analyze" / "complete" / "dry-run"
    pub mode: String,
    pub content_files: usize,
    pub skeleton_files: usize,
    pub plan: Vec<PlannedFile>,
    pub execution: Option<ExecutionSummary>,
    /// 已写入的报告路径
    pub reports: Vec<String>,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering_and_raise() {
        assert!(Tier::Critical > Tier::High);
        assert!(Tier::High > Tier::Medium);
        assert!(Tier::Medium > Tier::Low);
        assert_eq!(Tier::Medium.raise_to(Tier::High), Tier::High);
        assert_eq!(Tier::Critical.raise_to(Tier::High), Tier::Critical);
    }

    #[test]
    fn test_execution_summary_counts() {
        let mut summary = ExecutionSummary::default();
        for outcome in [
            ExecutionOutcome::Completed,
            ExecutionOutcome::Completed,
            ExecutionOutcome::SkippedExists,
            ExecutionOutcome::SkippedNoTemplate,
            ExecutionOutcome::Failed {
                reason: "denied".to_string(),
            },
        ] {
            summary.push(ExecutionRecord {
                relative_path: "a.ts".to_string(),
                template_id: "basic".to_string(),
                tier: Tier::Medium,
                outcome,
            });
        }
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.failed, 1);
        // 2 / (2 + 1 + 1)
        assert_eq!(summary.success_rate(), Some(50));
    }

    #[test]
    fn test_success_rate_empty() {
        assert_eq!(ExecutionSummary::default().success_rate(), None);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&ExecutionOutcome::SkippedExists).unwrap();
        assert_eq!(json, r#"{"status":"skipped-exists"}"#);
    }
}
