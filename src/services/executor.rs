// ============================================================================
// 补全执行服务：按计划顺序逐个写入模板文本
// ✅ 只能做：创建新文件、填充当前为空的文件
// ⛔ 禁止：并发写入；截断或覆盖任何已有内容的文件
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::models::dtos::{CompletionPlan, ExecutionOutcome, ExecutionRecord, ExecutionSummary, PlanEntry};
use crate::services::template_registry::TemplateRegistry;
use crate::utils::error::{AppError, AppResult};

/// 单次写入的结果
enum WriteOutcome {
    Written,
    AlreadyHasContent,
}

/// 严格按排序顺序执行计划；单个条目失败只记录，不中断后续条目
///
/// `dry_run` 为 true 时不写任何文件，本应写入的条目记为 planned。
pub fn execute_plan(plan: &CompletionPlan, registry: &dyn TemplateRegistry, dry_run: bool) -> ExecutionSummary {
    let mut summary = ExecutionSummary::default();

    for entry in &plan.ranked {
        let outcome = execute_entry(entry, registry, dry_run);
        summary.push(ExecutionRecord {
            relative_path: entry.relative_path.clone(),
            template_id: entry.template_id.clone(),
            tier: entry.tier,
            outcome,
        });
    }

    log::info!(
        "补全执行结束：完成 {}，计划 {}，跳过 {}，失败 {}",
        summary.completed,
        summary.planned,
        summary.skipped(),
        summary.failed
    );
    summary
}

fn execute_entry(entry: &PlanEntry, registry: &dyn TemplateRegistry, dry_run: bool) -> ExecutionOutcome {
    let Some(text) = registry.generate(&entry.template_id) else {
        log::debug!("未注册的模板 {}，跳过 {}", entry.template_id, entry.relative_path);
        return ExecutionOutcome::SkippedNoTemplate;
    };

    let target = entry.record.path.as_path();

    if dry_run {
        return match std::fs::metadata(target) {
            Ok(meta) if meta.len() > 0 => ExecutionOutcome::SkippedExists,
            _ => ExecutionOutcome::Planned,
        };
    }

    match write_if_empty(target, &text) {
        Ok(WriteOutcome::Written) => {
            log::info!("已补全 {}（模板 {}）", entry.relative_path, entry.template_id);
            ExecutionOutcome::Completed
        }
        Ok(WriteOutcome::AlreadyHasContent) => {
            log::info!("{} 已有内容，保持不变", entry.relative_path);
            ExecutionOutcome::SkippedExists
        }
        Err(e) => {
            log::error!("补全 {} 失败：{}", entry.relative_path, e);
            ExecutionOutcome::Failed { reason: e.to_string() }
        }
    }
}

/// 以不截断的方式打开目标文件，写入前再检查一次当前大小
fn write_if_empty(target: &Path, text: &str) -> AppResult<WriteOutcome> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::WriteError(format!("无法创建目录 {}：{}", parent.display(), e)))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(target)
        .map_err(|e| AppError::WriteError(format!("无法打开 {}：{}", target.display(), e)))?;

    let current_len = file
        .metadata()
        .map_err(|e| AppError::WriteError(format!("无法读取 {} 的元数据：{}", target.display(), e)))?
        .len();
    if current_len > 0 {
        return Ok(WriteOutcome::AlreadyHasContent);
    }

    file.write_all(text.as_bytes())
        .map_err(|e| AppError::WriteError(format!("写入 {} 失败：{}", target.display(), e)))?;

    Ok(WriteOutcome::Written)
}

// ============================================================================
// 单元测试
// ============================================================================
