// ============================================================================
// 补全规划服务：为骨架文件打分、提升优先级、选择模板、全局排序并划分阶段
// 规划过程不会失败：缺失的意图按默认意图处理，每个分支都有兜底值
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::dtos::{CompletionPlan, FileRecord, Intention, Phase, PlanEntry, Purpose, Tier};
use crate::utils::path;

/// 阶段名称，按 critical → low 的顺序
const PHASE_NAMES: [(Tier, &str); 4] = [
    (Tier::Critical, "Critical Infrastructure (Tokens & Exports)"),
    (Tier::High, "Core Systems (Components & Integrations)"),
    (Tier::Medium, "Component Systems (Icons & Utilities)"),
    (Tier::Low, "Enhancement Systems (Validation & Build)"),
];

/// 路径深度加分的上限
const SHALLOW_PATH_BONUS: usize = 10;

// ============================================================================
// 打分
// ============================================================================

/// 计算综合得分与最终优先级；优先级从意图的优先级出发，只升不降
pub fn score_entry(record: &FileRecord, intention: &Intention) -> (u32, Tier) {
    let mut score = intention.confidence;
    let mut tier = intention.tier;

    match intention.purpose {
        Purpose::ExportAggregator => {
            score += 100;
            tier = Tier::Critical;
        }
        Purpose::TokenSystem => {
            score += 90;
            tier = tier.raise_to(Tier::Critical);
        }
        Purpose::ValidationSystem => {
            score += 80;
            tier = tier.raise_to(Tier::High);
        }
        Purpose::ExternalIntegration => {
            score += 85;
            tier = tier.raise_to(Tier::High);
        }
        _ => {}
    }

    if record.directory.contains("core") || record.directory.contains("foundation") {
        score += 50;
        tier = tier.raise_to(Tier::High);
    }

    score += 10 * intention.related_files.len() as u32;

    let depth = path::depth(&record.relative_path);
    score += SHALLOW_PATH_BONUS.saturating_sub(depth) as u32;

    (score, tier)
}

// ============================================================================
// 模板选择
// ============================================================================

type KeywordTable = &'static [(&'static [&'static str], &'static str)];

const TOKEN_TEMPLATES: KeywordTable = &[
    (&["color"], "token-colors-esm"),
    (&["animation"], "token-animations-esm"),
    (&["effect"], "token-effects-esm"),
    (&["gradient"], "token-gradients-esm"),
    (&["apple-hig"], "token-apple-hig-esm"),
    (&["accessibility"], "token-accessibility-esm"),
    (&["responsive"], "token-responsive-esm"),
    (&["ecommerce"], "token-theme-ecommerce-esm"),
    (&["enterprise"], "token-theme-enterprise-esm"),
    (&["gaming", "petersen"], "token-theme-gaming-esm"),
];

const COMPONENT_TEMPLATES: KeywordTable = &[
    (&["Navigation"], "component-navigation-esm"),
    (&["Grid"], "component-grid-esm"),
    (&["Container"], "component-container-esm"),
    (&["Layout"], "component-layout-esm"),
    (&["Section"], "component-section-esm"),
    (&["Sidebar"], "component-sidebar-esm"),
    (&["Quantum", "Spatial"], "component-quantum-spatial-esm"),
    (&["Glass", "Liquid"], "component-glass-esm"),
    (&["Apple"], "component-apple-navigation-esm"),
    (&["Breakpoint"], "component-breakpoints-esm"),
    (&["MediaQuer"], "component-media-queries-esm"),
    (&["Responsive"], "component-responsive-esm"),
    (&["Theme"], "provider-theme-esm"),
    (&["Provider"], "provider-responsive-esm"),
];

const SCSS_TEMPLATES: KeywordTable = &[
    (&["variable"], "scss-variables"),
    (&["mixin"], "scss-mixins"),
    (&["responsive"], "scss-responsive"),
];

const CSS_TEMPLATES: KeywordTable = &[
    (&["apple-hig"], "css-apple-hig"),
    (&["global"], "css-global"),
    (&["liquid-glass"], "css-liquid-glass"),
    (&["responsive"], "css-responsive"),
];

const HOOK_TEMPLATES: KeywordTable = &[
    (&["Breakpoint"], "hook-breakpoint-esm"),
    (&["DesignSystem"], "hook-design-system-esm"),
    (&["Responsive"], "hook-responsive-esm"),
    (&["Theme"], "hook-theme-esm"),
    (&["Token"], "hook-tokens-esm"),
];

const TOOL_TEMPLATES: KeywordTable = &[
    (&["generator"], "tool-generator-esm"),
    (&["validator"], "tool-validator-esm"),
];

/// 文件名包含表中任一关键字的第一项
fn first_keyword_match(name: &str, table: KeywordTable) -> Option<&'static str> {
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(*k)))
        .map(|(_, id)| *id)
}

/// 按文件名、扩展名与所在目录逐级选择模板 id
///
/// 与排序无关；选出的 id 可能没有注册的生成器（如意图建议的 `basic`）。
pub fn select_template(relative_path: &str, intention: &Intention) -> String {
    let name = path::base_name(relative_path);
    let ext = path::extension(relative_path);
    let dir = path::directory(relative_path);

    let id = if dir.contains("tokens") {
        first_keyword_match(name, TOKEN_TEMPLATES).unwrap_or("design-token-definitions-esm")
    } else if ext == ".tsx" && !name.contains("test") {
        first_keyword_match(name, COMPONENT_TEMPLATES).unwrap_or(if dir.contains("examples") {
            "example-component-esm"
        } else {
            "react-component-esm"
        })
    } else if ext == ".scss" {
        first_keyword_match(name, SCSS_TEMPLATES).unwrap_or("scss-system")
    } else if ext == ".css" {
        first_keyword_match(name, CSS_TEMPLATES).unwrap_or(if dir.contains("components") {
            "css-component"
        } else {
            "css-system"
        })
    } else if dir.contains("hooks") {
        first_keyword_match(name, HOOK_TEMPLATES).unwrap_or("hook-generic-esm")
    } else if name.contains("test") || dir.contains("tests") {
        if ext == ".js" && name.contains("jest") {
            "jest-config"
        } else if name.contains("setup") {
            "test-setup-esm"
        } else {
            "test-component-esm"
        }
    } else if dir.contains("tools") {
        first_keyword_match(name, TOOL_TEMPLATES).unwrap_or("tool-script-esm")
    } else if dir.contains("catalog") {
        match ext {
            ".json" => "catalog-json",
            ".md" => "catalog-markdown",
            _ => "basic-typescript-esm",
        }
    } else if !intention.template_suggestion.is_empty() {
        return intention.template_suggestion.clone();
    } else {
        "basic-typescript-esm"
    };

    id.to_string()
}

// ============================================================================
// 排序与分阶段
// ============================================================================

/// 全序：优先级降序 → 置信度降序 → 得分降序 → 相对路径升序
pub fn compare_entries(a: &PlanEntry, b: &PlanEntry) -> Ordering {
    b.tier
        .cmp(&a.tier)
        .then_with(|| b.intention.confidence.cmp(&a.intention.confidence))
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.relative_path.cmp(&b.relative_path))
}

/// 按优先级分入 4 个固定阶段，保持计划顺序
pub fn organize_phases(ranked: &[PlanEntry]) -> Vec<Phase> {
    PHASE_NAMES
        .iter()
        .map(|(tier, name)| Phase {
            name: name.to_string(),
            tier: *tier,
            entries: ranked.iter().filter(|e| e.tier == *tier).cloned().collect(),
        })
        .collect()
}

/// 为全部骨架文件生成排序后的补全计划
pub fn build_plan(
    skeleton: &BTreeMap<String, FileRecord>,
    intentions: &BTreeMap<String, Intention>,
) -> CompletionPlan {
    let mut ranked: Vec<PlanEntry> = skeleton
        .iter()
        .map(|(relative_path, record)| {
            let intention = intentions.get(relative_path).cloned().unwrap_or_default();
            let (score, tier) = score_entry(record, &intention);
            PlanEntry {
                relative_path: relative_path.clone(),
                template_id: select_template(relative_path, &intention),
                dependencies: intention.related_files.clone(),
                record: record.clone(),
                intention,
                score,
                tier,
            }
        })
        .collect();

    ranked.sort_by(compare_entries);
    let phases = organize_phases(&ranked);

    let plan = CompletionPlan { ranked, phases };
    log::info!(
        "补全计划：critical {}，high {}，medium {}，low {}",
        plan.count_by_tier(Tier::Critical),
        plan.count_by_tier(Tier::High),
        plan.count_by_tier(Tier::Medium),
        plan.count_by_tier(Tier::Low)
    );
    plan
}

// ============================================================================
// 单元测试
// ============================================================================
