// ============================================================================
// 流水线编排：扫描 → 学习 → 推断 → 关系映射 → 规划 →（执行）→ 报告
// 每次运行拥有独立的 RunContext；各阶段只通过上下文中的表交换数据
// ============================================================================

use std::path::PathBuf;
use std::time::Instant;

use crate::models::config::CompletionConfig;
use crate::models::context::RunContext;
use crate::models::dtos::FileRecord;
use crate::services::batch::BatchRunner;
use crate::services::classifier::Classifier;
use crate::services::executor;
use crate::services::intention;
use crate::services::pattern_learner::PatternLearner;
use crate::services::planner;
use crate::services::relationship;
use crate::services::report::ArchitectureReport;
use crate::services::scanner::Scanner;
use crate::services::template_registry::{BuiltinTemplates, TemplateRegistry};
use crate::utils::error::AppResult;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 只分析与规划，不写任何骨架文件
    Analyze,
    /// 完整流水线，按配置决定是否为演练
    Complete,
}

/// 一次运行的产物
#[derive(Debug)]
pub struct RunOutput {
    pub context: RunContext,
    /// 已写入的报告路径（Markdown, JSON）
    pub report_paths: Option<(PathBuf, PathBuf)>,
}

/// 流水线：持有配置与各阶段共享的只读组件
pub struct Pipeline {
    config: CompletionConfig,
    classifier: Classifier,
    learner: PatternLearner,
    runner: BatchRunner,
    registry: Box<dyn TemplateRegistry>,
}

impl Pipeline {
    /// 使用内置模板注册表创建流水线
    pub fn new(config: CompletionConfig) -> AppResult<Self> {
        Self::with_registry(config, Box::new(BuiltinTemplates))
    }

    pub fn with_registry(config: CompletionConfig, registry: Box<dyn TemplateRegistry>) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new()?,
            learner: PatternLearner::new(config.learning_threshold)?,
            runner: BatchRunner::new(config.workers)?,
            registry,
            config,
        })
    }

    /// 执行一次运行；只有报告写入失败等致命错误才返回 Err
    pub fn run(&self, mode: RunMode) -> AppResult<RunOutput> {
        let started = Instant::now();
        let mut ctx = RunContext::default();

        // 1. 扫描
        let stage = Instant::now();
        let scan = Scanner::new(&self.config, &self.classifier, &self.runner).scan_roots();
        ctx.stats.files_processed = scan.files_processed();
        ctx.stats.directories_skipped = scan.directories_skipped;
        ctx.stats.files_failed = scan.files_failed;
        ctx.stats.parallel_batches += scan.batches;
        ctx.content = scan.content;
        ctx.skeleton = scan.skeleton;
        ctx.stats.scan_ms = stage.elapsed().as_millis();

        // 2. 模式学习
        let stage = Instant::now();
        let content: Vec<&FileRecord> = ctx.content.values().collect();
        ctx.stats.parallel_batches += self.learner.learn_all(&self.runner, &content, &mut ctx.patterns);
        ctx.stats.learn_ms = stage.elapsed().as_millis();

        // 3. 意图推断
        let stage = Instant::now();
        let skeletons: Vec<&FileRecord> = ctx.skeleton.values().collect();
        ctx.stats.parallel_batches += intention::infer_all(&self.runner, &skeletons, &ctx.content, &mut ctx.intentions);
        ctx.stats.infer_ms = stage.elapsed().as_millis();

        // 4. 关系映射
        let stage = Instant::now();
        ctx.relationships = relationship::map_relationships(&ctx.content, &ctx.intentions);
        ctx.stats.map_ms = stage.elapsed().as_millis();

        // 5. 规划
        let stage = Instant::now();
        ctx.plan = planner::build_plan(&ctx.skeleton, &ctx.intentions);
        ctx.stats.plan_ms = stage.elapsed().as_millis();

        // 6. 执行（严格串行）
        if mode == RunMode::Complete {
            let stage = Instant::now();
            ctx.execution = Some(executor::execute_plan(&ctx.plan, self.registry.as_ref(), self.config.dry_run));
            ctx.stats.execute_ms = stage.elapsed().as_millis();
        }

        ctx.stats.total_ms = started.elapsed().as_millis();

        // 7. 报告
        let report = ArchitectureReport::build(&ctx, &self.config.roots);
        let report_paths = match self.config.primary_root() {
            Some(root) if self.config.write_reports && root.is_dir() => Some(report.write_to(root)?),
            Some(root) if self.config.write_reports => {
                log::warn!("主根目录不可用，未写入报告：{}", root.display());
                None
            }
            _ => None,
        };

        Ok(RunOutput {
            context: ctx,
            report_paths,
        })
    }
}

// ============================================================================
// 端到端测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dtos::{ExecutionOutcome, Purpose, Tier};
    use crate::services::{REPORT_JSON, REPORT_MARKDOWN};
    use proptest::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative_path: &str, content: &str) {
        let full = root.join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    fn config(root: &Path) -> CompletionConfig {
        let mut config = CompletionConfig::with_roots(vec![root.to_path_buf()]);
        config.workers = 2;
        config
    }

    fn design_system(root: &Path) {
        write(
            root,
            "tokens/spacing.ts",
            "export const spacing = {\n  sm: '4px',\n  md: '8px',\n};\n",
        );
        write(root, "tokens/colors.ts", "");
        write(root, "index.ts", "");
        write(
            root,
            "utils/format.ts",
            &"export function format(value: string): string {\n  return value.trim();\n}\n".repeat(20),
        );
        write(root, "utils/format.helper.ts", "");
        write(root, "components/Button.tsx", &"x".repeat(120));
        write(root, "lib/validate.ts", "");
    }

    #[test]
    fn test_token_skeleton_in_tokens_dir() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());

        let out = Pipeline::new(config(dir.path())).unwrap().run(RunMode::Analyze).unwrap();
        let intention = &out.context.intentions["tokens/colors.ts"];
        assert_eq!(intention.purpose, Purpose::TokenSystem);
        assert_eq!(intention.tier, Tier::Critical);

        let entry = out
            .context
            .plan
            .ranked
            .iter()
            .find(|e| e.relative_path == "tokens/colors.ts")
            .unwrap();
        assert_eq!(entry.template_id, "token-colors-esm");
    }

    #[test]
    fn test_index_skeleton_leads_the_plan() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());

        let out = Pipeline::new(config(dir.path())).unwrap().run(RunMode::Analyze).unwrap();
        let first = &out.context.plan.ranked[0];
        assert_eq!(first.relative_path, "index.ts");
        assert_eq!(first.intention.purpose, Purpose::ExportAggregator);
        assert_eq!(first.tier, Tier::Critical);
        assert!(first.score >= 195);
        assert!(out.context.plan.phases[0].entries.iter().any(|e| e.relative_path == "index.ts"));
    }

    #[test]
    fn test_helper_skeleton_relates_to_content_file() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());

        let out = Pipeline::new(config(dir.path())).unwrap().run(RunMode::Analyze).unwrap();
        let ctx = &out.context;
        assert!(ctx.content["utils/format.ts"].complexity.score > 50);
        assert!(ctx.intentions["utils/format.helper.ts"]
            .related_files
            .contains(&"utils/format.ts".to_string()));
        assert!(ctx.relationships["utils/format.ts"]
            .related_skeleton
            .contains(&"utils/format.helper.ts".to_string()));
        assert!(ctx.patterns.utility.contains_key("utils/format.ts"));
    }

    #[test]
    fn test_existing_content_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());

        let mut ctx = Pipeline::new(config(dir.path())).unwrap().run(RunMode::Analyze).unwrap().context;
        // 规划之后才被其他人写入内容
        write(dir.path(), "lib/validate.ts", "export const validate = () => true;");
        let summary = executor::execute_plan(&ctx.plan, &BuiltinTemplates, false);
        ctx.execution = Some(summary);

        let summary = ctx.execution.as_ref().unwrap();
        let record = summary.records.iter().find(|r| r.relative_path == "lib/validate.ts").unwrap();
        assert_eq!(record.outcome, ExecutionOutcome::SkippedExists);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lib/validate.ts")).unwrap(),
            "export const validate = () => true;"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("components/Button.tsx")).unwrap(),
            "x".repeat(120)
        );
    }

    #[test]
    fn test_second_run_completes_nothing() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());
        let pipeline = Pipeline::new(config(dir.path())).unwrap();

        let first = pipeline.run(RunMode::Complete).unwrap();
        assert!(first.context.execution.as_ref().unwrap().completed > 0);

        let second = pipeline.run(RunMode::Complete).unwrap();
        assert_eq!(second.context.execution.as_ref().unwrap().completed, 0);
    }

    #[test]
    fn test_analyze_writes_reports_but_no_skeletons() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());

        let out = Pipeline::new(config(dir.path())).unwrap().run(RunMode::Analyze).unwrap();

        assert!(out.context.execution.is_none());
        assert_eq!(std::fs::metadata(dir.path().join("index.ts")).unwrap().len(), 0);
        assert!(dir.path().join(REPORT_MARKDOWN).is_file());
        assert!(dir.path().join(REPORT_JSON).is_file());
        assert!(out.report_paths.is_some());
    }

    #[test]
    fn test_dry_run_plans_without_writing() {
        let dir = TempDir::new().unwrap();
        design_system(dir.path());
        let mut cfg = config(dir.path());
        cfg.dry_run = true;
        cfg.write_reports = false;

        let out = Pipeline::new(cfg).unwrap().run(RunMode::Complete).unwrap();
        let summary = out.context.execution.as_ref().unwrap();

        assert_eq!(summary.completed, 0);
        assert!(summary.planned > 0);
        assert_eq!(std::fs::metadata(dir.path().join("index.ts")).unwrap().len(), 0);
        assert!(!dir.path().join(REPORT_MARKDOWN).exists());
    }

    #[test]
    fn test_missing_primary_root_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir.path().join("absent"));
        let out = Pipeline::new(cfg).unwrap().run(RunMode::Complete).unwrap();
        assert_eq!(out.context.total_files(), 0);
        assert!(out.report_paths.is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut cfg = CompletionConfig::default();
        assert!(Pipeline::new(cfg.clone()).is_err());
        cfg.roots = vec![PathBuf::from("/tmp")];
        cfg.workers = 0;
        assert!(Pipeline::new(cfg).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_every_file_lands_in_exactly_one_table(
            files in prop::collection::btree_map("[a-z]{1,8}", 0usize..40, 1..12)
        ) {
            let dir = TempDir::new().unwrap();
            for (name, size) in &files {
                write(dir.path(), &format!("src/{}.ts", name), &"a".repeat(*size));
            }
            let mut cfg = config(dir.path());
            cfg.exclude_patterns.clear();
            cfg.write_reports = false;

            let ctx = Pipeline::new(cfg).unwrap().run(RunMode::Analyze).unwrap().context;

            prop_assert_eq!(ctx.total_files(), files.len());
            for (name, size) in &files {
                let key = format!("src/{}.ts", name);
                let in_content = ctx.content.contains_key(&key);
                let in_skeleton = ctx.skeleton.contains_key(&key);
                prop_assert!(in_content != in_skeleton);
                prop_assert_eq!(in_skeleton, *size == 0);
            }
            prop_assert_eq!(ctx.intentions.len(), ctx.skeleton.len());
            prop_assert_eq!(ctx.plan.ranked.len(), ctx.skeleton.len());
        }
    }
}
