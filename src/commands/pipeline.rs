// ============================================================================
// 流水线相关 Commands
// 负责：analyze / complete 两个入口，把服务层结果整理为 RunSummary
// ============================================================================

use crate::models::config::CompletionConfig;
use crate::models::dtos::{PlannedFile, RunSummary};
use crate::services::pipeline::{Pipeline, RunMode, RunOutput};

/// 分析项目：扫描、学习、推断、映射、规划并生成报告，不写任何骨架文件
pub fn analyze_project(config: CompletionConfig) -> Result<RunSummary, String> {
    let pipeline = Pipeline::new(config)?;
    let output = pipeline.run(RunMode::Analyze)?;
    Ok(summarize("analyze", output))
}

/// 补全项目：完整流水线；配置为演练模式时只记录本应写入的文件
pub fn complete_project(config: CompletionConfig) -> Result<RunSummary, String> {
    let mode = if config.dry_run { "dry-run" } else { "complete" };
    let pipeline = Pipeline::new(config)?;
    let output = pipeline.run(RunMode::Complete)?;
    Ok(summarize(mode, output))
}

fn summarize(mode: &str, output: RunOutput) -> RunSummary {
    let ctx = output.context;

    let plan = ctx
        .plan
        .ranked
        .iter()
        .map(|entry| PlannedFile {
            relative_path: entry.relative_path.clone(),
            tier: entry.tier,
            score: entry.score,
            template_id: entry.template_id.clone(),
        })
        .collect();

    let reports = output
        .report_paths
        .map(|(markdown, json)| vec![markdown.display().to_string(), json.display().to_string()])
        .unwrap_or_default();

    RunSummary {
        mode: mode.to_string(),
        content_files: ctx.content.len(),
        skeleton_files: ctx.skeleton.len(),
        plan,
        execution: ctx.execution,
        reports,
        stats: ctx.stats,
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("tokens")).unwrap();
        std::fs::write(dir.path().join("tokens/colors.ts"), "").unwrap();
        std::fs::write(dir.path().join("index.ts"), "").unwrap();
        std::fs::write(dir.path().join("tokens/spacing.ts"), "export const spacing = {};").unwrap();
        dir
    }

    #[test]
    fn test_analyze_project_summary() {
        let dir = project();
        let summary = analyze_project(CompletionConfig::with_roots(vec![dir.path().to_path_buf()])).unwrap();

        assert_eq!(summary.mode, "analyze");
        assert_eq!(summary.content_files, 1);
        assert_eq!(summary.skeleton_files, 2);
        assert_eq!(summary.plan.len(), 2);
        assert_eq!(summary.plan[0].relative_path, "index.ts");
        assert!(summary.execution.is_none());
        assert_eq!(summary.reports.len(), 2);
    }

    #[test]
    fn test_complete_project_dry_run_mode() {
        let dir = project();
        let mut config = CompletionConfig::with_roots(vec![dir.path().to_path_buf()]);
        config.dry_run = true;
        config.write_reports = false;

        let summary = complete_project(config).unwrap();
        assert_eq!(summary.mode, "dry-run");
        assert_eq!(summary.execution.unwrap().planned, 2);
        assert!(summary.reports.is_empty());
    }

    #[test]
    fn test_invalid_config_becomes_string_error() {
        let err = analyze_project(CompletionConfig::default()).unwrap_err();
        assert!(err.contains("根目录"));
    }
}
