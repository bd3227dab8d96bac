// ============================================================================
// 意图推断服务：为每个骨架文件推断用途、优先级、模板建议与相关文件
// 规则表按顺序全部求值，命中的规则覆盖其负责的字段（后命中者生效）
// ============================================================================

use std::collections::BTreeMap;

use crate::models::dtos::{FileRecord, Intention, Purpose, Tier};
use crate::services::batch::BatchRunner;
use crate::utils::path;

/// 规则判定所需的路径片段
pub struct NameParts<'a> {
    /// 去掉扩展名的文件名（大小写保持原样）
    pub base: &'a str,
    /// 扩展名（含前导点）
    pub extension: &'a str,
    /// 所在目录的最后一段名称
    pub parent_dir: &'a str,
}

impl<'a> NameParts<'a> {
    pub fn of(relative_path: &'a str) -> Self {
        Self {
            base: path::base_name(relative_path),
            extension: path::extension(relative_path),
            parent_dir: path::parent_dir_name(relative_path),
        }
    }
}

/// 意图规则：命中后整体覆盖 purpose/tier/template/exports/confidence
struct IntentionRule {
    purpose: Purpose,
    tier: Tier,
    template: &'static str,
    expected_exports: &'static [&'static str],
    confidence: u32,
    matches: fn(&NameParts) -> bool,
}

const INTENTION_RULES: &[IntentionRule] = &[
    IntentionRule {
        purpose: Purpose::ExportAggregator,
        tier: Tier::Critical,
        template: "index-exports-esm",
        expected_exports: &["*"],
        confidence: 95,
        matches: |n| n.base == "index",
    },
    IntentionRule {
        purpose: Purpose::TokenSystem,
        tier: Tier::Critical,
        template: "design-token-definitions-esm",
        expected_exports: &["tokens", "interfaces"],
        confidence: 90,
        matches: |n| {
            n.base.contains("token")
                || n.base.contains("design-token")
                || (n.parent_dir.contains("token") && n.base != "index")
        },
    },
    IntentionRule {
        purpose: Purpose::ComponentDefinition,
        tier: Tier::High,
        template: "react-component-esm",
        expected_exports: &["component"],
        confidence: 85,
        matches: |n| n.base.contains("component"),
    },
    IntentionRule {
        purpose: Purpose::IconComponent,
        tier: Tier::High,
        template: "icon-component-esm",
        expected_exports: &["Icon"],
        confidence: 80,
        matches: |n| n.base.contains("icon"),
    },
    IntentionRule {
        purpose: Purpose::UtilityFunctions,
        tier: Tier::Medium,
        template: "utility-functions-esm",
        expected_exports: &["functions"],
        confidence: 70,
        matches: |n| n.base.contains("util") || n.base.contains("helper"),
    },
    IntentionRule {
        purpose: Purpose::ValidationSystem,
        tier: Tier::High,
        template: "validation-functions-esm",
        expected_exports: &["validators", "interfaces"],
        confidence: 85,
        matches: |n| n.base.contains("validation") || n.base.contains("validate"),
    },
    IntentionRule {
        purpose: Purpose::StylingSystem,
        tier: Tier::Medium,
        template: "style-definitions",
        expected_exports: &["styles"],
        confidence: 75,
        matches: |n| n.base.contains("style") || n.extension == ".scss",
    },
    IntentionRule {
        purpose: Purpose::ExternalIntegration,
        tier: Tier::High,
        template: "code-connect-esm",
        expected_exports: &["integrationConfig"],
        confidence: 90,
        matches: |n| n.base.contains("figma") || n.base.contains("integration"),
    },
];

/// 对骨架路径应用规则表（不含相关文件），后命中的规则覆盖先命中的
pub fn apply_rules(relative_path: &str) -> Intention {
    let parts = NameParts::of(relative_path);
    let mut intention = Intention::default();

    for rule in INTENTION_RULES {
        if (rule.matches)(&parts) {
            intention.purpose = rule.purpose;
            intention.tier = rule.tier;
            intention.template_suggestion = rule.template.to_string();
            intention.expected_exports = rule.expected_exports.iter().map(|s| s.to_string()).collect();
            intention.confidence = rule.confidence;
        }
    }

    intention
}

/// 相关文件：同目录的内容文件，或文件名（去扩展名）互相包含的内容文件
///
/// 双向子串包含容易误报（如 "a" 与任何含 a 的文件名），保持该行为不做收紧。
pub fn find_related_files(skeleton: &FileRecord, content: &BTreeMap<String, FileRecord>) -> Vec<String> {
    let name = skeleton.base_name();
    let directory = skeleton.directory.as_str();

    content
        .values()
        .filter(|other| {
            let other_name = other.base_name();
            other.directory == directory || other_name.contains(name) || name.contains(other_name)
        })
        .map(|other| other.relative_path.clone())
        .collect()
}

/// 推断单个骨架文件的完整意图，永远有结果
pub fn infer_file_intention(skeleton: &FileRecord, content: &BTreeMap<String, FileRecord>) -> Intention {
    let mut intention = apply_rules(&skeleton.relative_path);
    intention.related_files = find_related_files(skeleton, content);
    intention
}

/// 分批并发推断全部骨架文件，join 后按路径写入意图表；返回执行的批次数
pub fn infer_all(
    runner: &BatchRunner,
    skeletons: &[&FileRecord],
    content: &BTreeMap<String, FileRecord>,
    intentions: &mut BTreeMap<String, Intention>,
) -> usize {
    let (inferred, batches) = runner.run(skeletons, |skeleton| {
        (skeleton.relative_path.clone(), infer_file_intention(skeleton, content))
    });

    for (relative_path, intention) in inferred {
        log::debug!(
            "意图推断：{} → {}（{}，置信度 {}）",
            relative_path,
            intention.purpose.as_str(),
            intention.tier.as_str(),
            intention.confidence
        );
        intentions.insert(relative_path, intention);
    }

    batches
}

// ============================================================================
// 单元测试
// ============================================================================
