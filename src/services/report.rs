// ============================================================================
// 报告服务：汇总运行上下文，生成 Markdown 报告与结构等价的 JSON 报告
// 只做聚合与格式化，不参与任何决策
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::models::context::RunContext;
use crate::models::dtos::{ExecutionSummary, RunStats, Tier};
use crate::models::patterns::PatternFamily;
use crate::services::{REPORT_JSON, REPORT_MARKDOWN};
use crate::utils::error::{AppError, AppResult};

/// 高合规阈值（含）
const HIGH_COMPLIANCE_SCORE: u32 = 80;

/// 常见检查项的展示数量
const TOP_CHECKS: usize = 5;

/// Markdown 中列出的最大内容文件数量
const LARGEST_FILES: usize = 10;

// ============================================================================
// 报告结构
// ============================================================================

#[derive(Serialize, Debug, Clone)]
pub struct ArchitectureReport {
    pub generated_at: String,
    pub roots: Vec<String>,
    pub metrics: ArchitectureMetrics,
    pub common_checks: Vec<CheckCount>,
    pub patterns: BTreeMap<PatternFamily, usize>,
    pub token_breakdown: Option<TokenBreakdown>,
    pub component_breakdown: Option<ComponentBreakdown>,
    pub phases: Vec<PhaseSummary>,
    pub execution: Option<ExecutionCounts>,
    pub stats: RunStats,
    pub files: Vec<InventoryEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ArchitectureMetrics {
    pub total_files: usize,
    pub content_files: usize,
    pub skeleton_files: usize,
    /// 内容文件占比（百分比，四舍五入）
    pub completion_rate: u32,
    /// 合规得分 > 0 的内容文件数
    pub compliance_files: usize,
    /// 上述文件的平均合规得分
    pub average_compliance: f64,
    pub high_compliance: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckCount {
    pub check: String,
    pub files: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenBreakdown {
    pub analyzed: usize,
    pub colors: usize,
    pub spacing: usize,
    pub typography: usize,
    pub es_modules: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ComponentBreakdown {
    pub analyzed: usize,
    pub react: usize,
    pub code_connect: usize,
    pub accessibility: usize,
    pub es_modules: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PhaseSummary {
    pub name: String,
    pub tier: Tier,
    pub files: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExecutionCounts {
    pub completed: usize,
    pub planned: usize,
    pub skipped_exists: usize,
    pub skipped_no_template: usize,
    pub failed: usize,
    pub success_rate: Option<u32>,
}

impl From<&ExecutionSummary> for ExecutionCounts {
    fn from(summary: &ExecutionSummary) -> Self {
        Self {
            completed: summary.completed,
            planned: summary.planned,
            skipped_exists: summary.skipped_exists,
            skipped_no_template: summary.skipped_no_template,
            failed: summary.failed,
            success_rate: summary.success_rate(),
        }
    }
}

/// 内容文件清单条目
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub relative_path: String,
    pub size: u64,
    pub category: String,
    pub complexity: usize,
    pub content_hash: Option<String>,
}

// ============================================================================
// 聚合
// ============================================================================

impl ArchitectureReport {
    /// 从运行上下文聚合报告
    pub fn build(ctx: &RunContext, roots: &[PathBuf]) -> Self {
        let scored: Vec<_> = ctx
            .content
            .values()
            .filter(|record| record.compliance.score > 0)
            .collect();

        let total_files = ctx.total_files();
        let completion_rate = if total_files == 0 {
            0
        } else {
            ((ctx.content.len() as f64 / total_files as f64) * 100.0).round() as u32
        };
        let average_compliance = if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|r| r.compliance.score as f64).sum::<f64>() / scored.len() as f64
        };

        let mut check_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &scored {
            for check in &record.compliance.checks {
                *check_counts.entry(check.as_str()).or_insert(0) += 1;
            }
        }
        let mut common_checks: Vec<CheckCount> = check_counts
            .into_iter()
            .map(|(check, files)| CheckCount {
                check: check.to_string(),
                files,
            })
            .collect();
        // 稳定排序：同数量时保持检查名的字典序
        common_checks.sort_by(|a, b| b.files.cmp(&a.files));
        common_checks.truncate(TOP_CHECKS);

        let tokens = &ctx.patterns.token;
        let token_breakdown = (!tokens.is_empty()).then(|| TokenBreakdown {
            analyzed: tokens.len(),
            colors: tokens.values().filter(|p| p.has_colors).count(),
            spacing: tokens.values().filter(|p| p.has_spacing).count(),
            typography: tokens.values().filter(|p| p.has_typography).count(),
            es_modules: tokens.values().filter(|p| p.is_es_module).count(),
        });

        let components = &ctx.patterns.component;
        let component_breakdown = (!components.is_empty()).then(|| ComponentBreakdown {
            analyzed: components.len(),
            react: components.values().filter(|p| p.is_react_component).count(),
            code_connect: components.values().filter(|p| p.has_code_connect).count(),
            accessibility: components.values().filter(|p| p.has_accessibility).count(),
            es_modules: components.values().filter(|p| p.is_es_module).count(),
        });

        let phases = ctx
            .plan
            .phases
            .iter()
            .map(|phase| PhaseSummary {
                name: phase.name.clone(),
                tier: phase.tier,
                files: phase.entries.len(),
            })
            .collect();

        let files = ctx
            .content
            .values()
            .map(|record| InventoryEntry {
                relative_path: record.relative_path.clone(),
                size: record.size,
                category: record.category.label().to_string(),
                complexity: record.complexity.score,
                content_hash: record.content_hash.clone(),
            })
            .collect();

        Self {
            generated_at: timestamp(),
            roots: roots.iter().map(|r| r.display().to_string()).collect(),
            metrics: ArchitectureMetrics {
                total_files,
                content_files: ctx.content.len(),
                skeleton_files: ctx.skeleton.len(),
                completion_rate,
                compliance_files: scored.len(),
                average_compliance,
                high_compliance: scored
                    .iter()
                    .filter(|r| r.compliance.score >= HIGH_COMPLIANCE_SCORE)
                    .count(),
            },
            common_checks,
            patterns: ctx.patterns.counts(),
            token_breakdown,
            component_breakdown,
            phases,
            execution: ctx.execution.as_ref().map(ExecutionCounts::from),
            stats: ctx.stats.clone(),
            files,
        }
    }

    /// 渲染为 Markdown
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }

    /// 写入主根目录下的两个报告文件，返回写入的路径
    pub fn write_to(&self, root: &Path) -> AppResult<(PathBuf, PathBuf)> {
        let markdown_path = root.join(REPORT_MARKDOWN);
        let json_path = root.join(REPORT_JSON);

        std::fs::write(&markdown_path, self.to_markdown())
            .map_err(|e| AppError::ReportError(format!("写入 {} 失败：{}", markdown_path.display(), e)))?;

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&json_path, json)
            .map_err(|e| AppError::ReportError(format!("写入 {} 失败：{}", json_path.display(), e)))?;

        log::info!("报告已生成：{}，{}", markdown_path.display(), json_path.display());
        Ok((markdown_path, json_path))
    }
}

impl fmt::Display for ArchitectureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;

        writeln!(f, "# Skeleton Architecture Analysis Report\n")?;
        writeln!(f, "**Generated**: {}", self.generated_at)?;
        writeln!(f, "**Roots**: {}\n", self.roots.join(", "))?;

        writeln!(f, "## Summary\n")?;
        writeln!(f, "- **Total Files**: {}", m.total_files)?;
        writeln!(f, "- **Files with Content**: {}", m.content_files)?;
        writeln!(f, "- **Skeleton Files**: {}", m.skeleton_files)?;
        writeln!(f, "- **Completion Rate**: {}%", m.completion_rate)?;
        writeln!(f, "- **Average Compliance**: {:.1}%\n", m.average_compliance)?;

        let s = &self.stats;
        writeln!(f, "## Run Statistics\n")?;
        writeln!(f, "- **Files Processed**: {}", s.files_processed)?;
        writeln!(f, "- **Parallel Batches**: {}", s.parallel_batches)?;
        writeln!(f, "- **Directories Skipped**: {}", s.directories_skipped)?;
        writeln!(f, "- **Files Failed**: {}", s.files_failed)?;
        writeln!(
            f,
            "- **Stage Times (ms)**: scan {}, learn {}, infer {}, map {}, plan {}, execute {}",
            s.scan_ms, s.learn_ms, s.infer_ms, s.map_ms, s.plan_ms, s.execute_ms
        )?;
        writeln!(f, "- **Total Time**: {}ms", s.total_ms)?;
        writeln!(f, "- **Files/Second**: {:.2}\n", s.files_per_second())?;

        writeln!(f, "## Pattern Discovery\n")?;
        for (family, count) in &self.patterns {
            writeln!(f, "- **{}**: {}", family.as_str(), count)?;
        }
        writeln!(f)?;

        if self.token_breakdown.is_none() && self.component_breakdown.is_none() {
            writeln!(f, "No patterns learned.\n")?;
        }
        if let Some(t) = &self.token_breakdown {
            writeln!(f, "### Token Patterns ({} analyzed)\n", t.analyzed)?;
            writeln!(f, "- Colors: {} files", t.colors)?;
            writeln!(f, "- Spacing: {} files", t.spacing)?;
            writeln!(f, "- Typography: {} files", t.typography)?;
            writeln!(f, "- ES Modules: {} files\n", t.es_modules)?;
        }
        if let Some(c) = &self.component_breakdown {
            writeln!(f, "### Component Patterns ({} analyzed)\n", c.analyzed)?;
            writeln!(f, "- React Components: {}", c.react)?;
            writeln!(f, "- Code Connect: {}", c.code_connect)?;
            writeln!(f, "- With Accessibility: {}", c.accessibility)?;
            writeln!(f, "- ES Modules: {} files\n", c.es_modules)?;
        }

        writeln!(f, "## Compliance\n")?;
        if m.compliance_files == 0 {
            writeln!(f, "No compliance data available.\n")?;
        } else {
            writeln!(f, "- **Files Analyzed**: {}", m.compliance_files)?;
            writeln!(f, "- **Average Score**: {:.1}%", m.average_compliance)?;
            writeln!(f, "- **High Compliance (>=80%)**: {} files", m.high_compliance)?;
            writeln!(
                f,
                "- **Needs Improvement (<80%)**: {} files\n",
                m.compliance_files - m.high_compliance
            )?;
            writeln!(f, "### Common Checks\n")?;
            for check in &self.common_checks {
                writeln!(f, "- {}: {} files", check.check, check.files)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Completion Plan\n")?;
        for (index, phase) in self.phases.iter().enumerate() {
            writeln!(f, "### Phase {}: {}\n", index + 1, phase.name)?;
            writeln!(f, "**Files**: {}\n", phase.files)?;
        }

        if let Some(e) = &self.execution {
            writeln!(f, "## Execution\n")?;
            writeln!(f, "- **Completed**: {}", e.completed)?;
            writeln!(f, "- **Planned (dry run)**: {}", e.planned)?;
            writeln!(f, "- **Skipped (existing content)**: {}", e.skipped_exists)?;
            writeln!(f, "- **Skipped (no template)**: {}", e.skipped_no_template)?;
            writeln!(f, "- **Failed**: {}", e.failed)?;
            match e.success_rate {
                Some(rate) => writeln!(f, "- **Success Rate**: {}%\n", rate)?,
                None => writeln!(f, "- **Success Rate**: n/a\n")?,
            }
        }

        if !self.files.is_empty() {
            let mut largest: Vec<&InventoryEntry> = self.files.iter().collect();
            largest.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.relative_path.cmp(&b.relative_path)));
            writeln!(f, "## Largest Content Files\n")?;
            writeln!(f, "| File | Size | Category | Complexity |")?;
            writeln!(f, "|------|------|----------|------------|")?;
            for entry in largest.into_iter().take(LARGEST_FILES) {
                writeln!(
                    f,
                    "| {} | {} | {} | {} |",
                    entry.relative_path,
                    format_size(entry.size),
                    entry.category,
                    entry.complexity
                )?;
            }
        }

        Ok(())
    }
}

/// 本地时区的 RFC 3339 时间戳；无法确定本地时区时使用 UTC
fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc3339).unwrap_or_default()
}

/// 人类可读的字节数（B / KB / MB，保留一位小数）
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["B", "KB", "MB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

// ============================================================================
// 单元测试
// ============================================================================
