// ============================================================================
// 文件分类服务：分类、复杂度、依赖/导出提取、模式标签、合规评分
// ✅ 只能做：基于路径和内容子串/正则的启发式判断
// ⛔ 禁止：真正的语法解析；访问文件系统
// ============================================================================

use regex::Regex;

use crate::models::dtos::{Category, ComplexityMetrics, ComplianceReport};
use crate::utils::error::{AppError, AppResult};

// ============================================================================
// 分类规则表（首个命中生效，顺序即语义）
// ============================================================================

/// 分类规则：先用小写路径判断是否命中，命中后再根据（小写路径, 内容）细分
struct CategoryRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    refine: fn(&str, &str) -> Category,
}

fn path_is_token(p: &str) -> bool {
    p.contains("token") || p.contains("design-token")
}

fn refine_token(_path: &str, content: &str) -> Category {
    if content.contains("interface") || content.contains("type") {
        Category::DesignTokenTypes
    } else if content.contains("export const") || content.contains("export default") {
        Category::DesignTokenDefinitions
    } else {
        Category::TokenSystem
    }
}

fn path_is_component(p: &str) -> bool {
    p.contains("component") || p.ends_with(".tsx") || p.ends_with(".jsx")
}

fn refine_component(_path: &str, content: &str) -> Category {
    if content.contains("React") || content.contains("jsx") {
        Category::ReactComponent
    } else if content.contains("figma.connect") {
        Category::CodeConnectComponent
    } else {
        Category::ComponentDefinition
    }
}

fn path_is_style(p: &str) -> bool {
    p.contains("style") || p.ends_with(".scss") || p.ends_with(".css")
}

fn refine_style(_path: &str, content: &str) -> Category {
    if content.contains("@mixin") || content.contains('$') {
        Category::ScssSystem
    } else if content.contains("--") || content.contains("var(") {
        Category::CssVariables
    } else if content.contains("glassmorphism") || content.contains("liquid-glass") {
        Category::GlassEffectStyles
    } else {
        Category::StyleSystem
    }
}

fn path_is_icon(p: &str) -> bool {
    p.contains("icon") || p.contains("svg")
}

fn path_is_figma(p: &str) -> bool {
    p.contains("figma")
}

fn refine_figma(path: &str, _content: &str) -> Category {
    if path.contains(".figma.") {
        Category::CodeConnectIntegration
    } else {
        Category::FigmaIntegration
    }
}

fn path_is_utility(p: &str) -> bool {
    p.contains("util") || p.contains("helper")
}

fn path_is_validation(p: &str) -> bool {
    p.contains("validation") || p.contains("validate")
}

fn path_is_build(p: &str) -> bool {
    p.contains("generator") || p.contains("build")
}

fn path_is_foundation(p: &str) -> bool {
    p.contains("pattern") || p.contains("foundation")
}

fn path_is_index(p: &str) -> bool {
    p.contains("index")
}

fn path_is_theme(p: &str) -> bool {
    p.contains("theme")
}

fn path_is_brand(p: &str) -> bool {
    p.contains("brand")
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "token",
        matches: path_is_token,
        refine: refine_token,
    },
    CategoryRule {
        name: "component",
        matches: path_is_component,
        refine: refine_component,
    },
    CategoryRule {
        name: "style",
        matches: path_is_style,
        refine: refine_style,
    },
    CategoryRule {
        name: "icon",
        matches: path_is_icon,
        refine: |_, _| Category::IconAsset,
    },
    CategoryRule {
        name: "integration",
        matches: path_is_figma,
        refine: refine_figma,
    },
    CategoryRule {
        name: "utility",
        matches: path_is_utility,
        refine: |_, _| Category::UtilitySystem,
    },
    CategoryRule {
        name: "validation",
        matches: path_is_validation,
        refine: |_, _| Category::ValidationSystem,
    },
    CategoryRule {
        name: "build-tool",
        matches: path_is_build,
        refine: |_, _| Category::BuildSystem,
    },
    CategoryRule {
        name: "foundation",
        matches: path_is_foundation,
        refine: |_, _| Category::FoundationPattern,
    },
    CategoryRule {
        name: "index",
        matches: path_is_index,
        refine: |_, _| Category::ExportIndex,
    },
    CategoryRule {
        name: "theme",
        matches: path_is_theme,
        refine: |_, _| Category::ThemeSystem,
    },
    CategoryRule {
        name: "brand",
        matches: path_is_brand,
        refine: |_, _| Category::BrandSystem,
    },
];

/// 按规则表顺序分类，首个命中生效；都不命中时为 System Component
pub fn categorize(relative_path: &str, content: &str) -> Category {
    let path_lower = relative_path.to_lowercase();
    for rule in CATEGORY_RULES {
        if (rule.matches)(&path_lower) {
            return (rule.refine)(&path_lower, content);
        }
    }
    Category::SystemComponent
}

/// 命中的规则名称（调试与测试用）
pub fn matching_rule(relative_path: &str) -> Option<&'static str> {
    let path_lower = relative_path.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(&path_lower))
        .map(|rule| rule.name)
}

// ============================================================================
// 模式标签与合规检查表
// ============================================================================

/// 模式标签：互相独立，一个文件可以带多个标签
const PATTERN_TAGS: &[(&str, fn(&str) -> bool)] = &[
    ("token-export-pattern", |c| {
        c.contains("export const") && c.contains("tokens")
    }),
    ("react-component-pattern", |c| {
        c.contains("React") && c.contains("interface")
    }),
    ("apple-hig-pattern", |c| {
        c.contains("SF Pro") || c.contains("44px") || c.contains("systemBlue")
    }),
    ("quantum-spatial-pattern", |c| {
        c.contains("quantum") || c.contains("spatial") || c.contains("glassmorphism")
    }),
    ("liquid-glass-pattern", |c| {
        c.contains("liquid-glass") || c.contains("liquidGlass")
    }),
    ("validation-pattern", |c| {
        c.contains("validate") && c.contains("interface")
    }),
    ("code-connect-pattern", |c| {
        c.contains("figma.connect") || c.contains("@figma/code-connect")
    }),
    ("design-system-token-pattern", |c| {
        c.contains("DesignToken") || c.contains("TokenSystem")
    }),
];

const SYSTEM_COLORS: &[&str] = &["systemBlue", "systemGreen", "systemRed", "#007AFF", "#34C759"];

/// 合规检查表：(检查项名称, 分值, 判定)
const COMPLIANCE_CHECKS: &[(&str, u32, fn(&str) -> bool)] = &[
    ("SF Pro font family", 20, |c| {
        c.contains("SF Pro") || c.contains("-apple-system")
    }),
    ("44px minimum touch target", 15, |c| {
        c.contains("44px") || c.contains("2.75rem")
    }),
    ("Apple system colors", 20, |c| {
        SYSTEM_COLORS.iter().any(|color| c.contains(color))
    }),
    ("Accessibility attributes", 15, |c| {
        c.contains("aria-") || c.contains("role=")
    }),
    ("Responsive design", 10, |c| {
        c.contains("@media") || c.contains("responsive")
    }),
    ("Dark mode support", 20, |c| {
        c.contains("dark") || c.contains("prefers-color-scheme")
    }),
];

/// 合规满分
pub const COMPLIANCE_MAX_SCORE: u32 = 100;

/// 计算内容的模式标签
pub fn identify_patterns(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    PATTERN_TAGS
        .iter()
        .filter(|(_, predicate)| predicate(content))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// 计算合规得分与通过的检查项
pub fn assess_compliance(content: &str) -> ComplianceReport {
    if content.is_empty() {
        return ComplianceReport {
            score: 0,
            checks: Vec::new(),
            max_score: COMPLIANCE_MAX_SCORE,
        };
    }
    let mut report = ComplianceReport {
        score: 0,
        checks: Vec::new(),
        max_score: COMPLIANCE_MAX_SCORE,
    };
    for (name, points, predicate) in COMPLIANCE_CHECKS {
        if predicate(content) {
            report.score += points;
            report.checks.push(name.to_string());
        }
    }
    report
}

// ============================================================================
// 分类器：持有预编译的正则
// ============================================================================

/// 单个文件的分类结果
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    pub complexity: ComplexityMetrics,
    pub dependencies: Vec<String>,
    pub exports: Vec<String>,
    pub patterns: Vec<String>,
    pub compliance: ComplianceReport,
}

/// 分类器：正则在构造时编译一次，之后可跨线程只读共享
pub struct Classifier {
    re_functions: Regex,
    re_interfaces: Regex,
    re_imports: Regex,
    re_exports: Regex,
    re_import_spec: Regex,
    re_require_spec: Regex,
    re_export_name: Regex,
    re_default_export: Regex,
}

impl Classifier {
    pub fn new() -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::ConfigError(format!("正则编译失败：{}", e)))
        };

        Ok(Self {
            re_functions: compile(r"function|const.*=|export")?,
            re_interfaces: compile(r"interface|type.*=")?,
            re_imports: compile(r"import.*from")?,
            re_exports: compile(r"export\s+(const|function|class|interface|type|default)")?,
            re_import_spec: compile(r#"import.*from\s+['"`]([^'"`]+)['"`]"#)?,
            re_require_spec: compile(r#"require\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#)?,
            re_export_name: compile(r"export\s+(?:const|function|class|interface|type)\s+(\w+)")?,
            re_default_export: compile(r"export\s+default\s+(\w+)")?,
        })
    }

    /// 对单个文件完成全部分类计算，永不失败
    pub fn classify(&self, relative_path: &str, content: &str) -> Classification {
        Classification {
            category: categorize(relative_path, content),
            complexity: self.assess_complexity(content),
            dependencies: self.extract_dependencies(content),
            exports: self.extract_exports(content),
            patterns: identify_patterns(content),
            compliance: assess_compliance(content),
        }
    }

    /// 复合复杂度：lines + 2×functions + 3×interfaces + imports + exports
    pub fn assess_complexity(&self, content: &str) -> ComplexityMetrics {
        if content.is_empty() {
            return ComplexityMetrics::default();
        }

        let lines = content.lines().count();
        let functions = self.re_functions.find_iter(content).count();
        let interfaces = self.re_interfaces.find_iter(content).count();
        let imports = self.re_imports.find_iter(content).count();
        let exports = self.re_exports.find_iter(content).count();

        ComplexityMetrics {
            lines,
            functions,
            interfaces,
            imports,
            exports,
            score: lines + functions * 2 + interfaces * 3 + imports + exports,
        }
    }

    /// 提取 import/require 的模块说明符（先 import 后 require）
    pub fn extract_dependencies(&self, content: &str) -> Vec<String> {
        if content.is_empty() {
            return Vec::new();
        }
        let imports = self
            .re_import_spec
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));
        let requires = self
            .re_require_spec
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));
        imports.chain(requires).collect()
    }

    /// 提取导出名称；默认导出记为 `default:<name>`
    pub fn extract_exports(&self, content: &str) -> Vec<String> {
        if content.is_empty() {
            return Vec::new();
        }
        let mut exports: Vec<String> = self
            .re_export_name
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        if let Some(name) = self
            .re_default_export
            .captures(content)
            .and_then(|caps| caps.get(1))
        {
            exports.push(format!("default:{}", name.as_str()));
        }

        exports
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classifier() -> Classifier {
        Classifier::new().unwrap()
    }

    #[test]
    fn test_token_rule_refines_on_content() {
        assert_eq!(
            categorize("tokens/colors.ts", "export interface Palette {}"),
            Category::DesignTokenTypes
        );
        assert_eq!(
            categorize("tokens/colors.ts", "export const red = '#f00';"),
            Category::DesignTokenDefinitions
        );
        assert_eq!(categorize("tokens/colors.ts", ""), Category::TokenSystem);
    }

    #[test]
    fn test_rule_order_token_beats_component() {
        // 同时命中 token 和 component（.tsx）规则，按顺序取 token
        assert_eq!(
            categorize("tokens/TokenPreview.tsx", "import React from 'react';"),
            Category::TokenSystem
        );
        assert_eq!(matching_rule("tokens/TokenPreview.tsx"), Some("token"));
    }

    #[test]
    fn test_rule_order_component_beats_style() {
        assert_eq!(
            categorize("styles/Card.tsx", "const x = React.createElement('div');"),
            Category::ReactComponent
        );
    }

    #[test]
    fn test_rule_order_utility_beats_validation() {
        assert_eq!(
            categorize("utils/validate-input.ts", "export function check() {}"),
            Category::UtilitySystem
        );
    }

    #[test]
    fn test_style_refinements() {
        assert_eq!(categorize("a/main.scss", "@mixin glass {}"), Category::ScssSystem);
        assert_eq!(categorize("a/vars.css", ":root { --x: 1; }"), Category::CssVariables);
        assert_eq!(
            categorize("a/panel.css", ".p { glassmorphism: on; }"),
            Category::GlassEffectStyles
        );
        assert_eq!(categorize("a/plain.css", "body {}"), Category::StyleSystem);
    }

    #[test]
    fn test_figma_integration_variants() {
        assert_eq!(
            categorize("figma/Button.figma.ts", "x"),
            Category::CodeConnectIntegration
        );
        assert_eq!(categorize("figma/sync.ts", "x"), Category::FigmaIntegration);
    }

    #[test]
    fn test_late_rules_and_default() {
        assert_eq!(categorize("scripts/generator.js", "x"), Category::BuildSystem);
        assert_eq!(categorize("foundation/grid.ts", "x"), Category::FoundationPattern);
        assert_eq!(categorize("lib/index.ts", "x"), Category::ExportIndex);
        assert_eq!(categorize("lib/theme.ts", "x"), Category::ThemeSystem);
        assert_eq!(categorize("lib/brand.ts", "x"), Category::BrandSystem);
        assert_eq!(categorize("lib/main.ts", "x"), Category::SystemComponent);
        assert_eq!(matching_rule("lib/main.ts"), None);
    }

    #[test]
    fn test_complexity_weights() {
        let content = "import { a } from './a';\nexport const b = 1;\ninterface C {}\n";
        let metrics = classifier().assess_complexity(content);
        assert_eq!(metrics.lines, 3);
        assert_eq!(metrics.imports, 1);
        // 第 2 行先命中 "export"，剩余部分再命中 "const b ="
        assert_eq!(metrics.functions, 2);
        assert_eq!(metrics.interfaces, 1);
        assert_eq!(metrics.exports, 1);
        assert_eq!(metrics.score, 3 + 2 * 2 + 3 + 1 + 1);
    }

    #[test]
    fn test_empty_content_defaults() {
        let result = classifier().classify("components/Button.tsx", "");
        assert_eq!(result.complexity, ComplexityMetrics::default());
        assert!(result.dependencies.is_empty());
        assert!(result.exports.is_empty());
        assert!(result.patterns.is_empty());
        assert_eq!(result.compliance.score, 0);
        assert_eq!(result.category, Category::ComponentDefinition);
    }

    #[test]
    fn test_extract_dependencies_import_then_require() {
        let content = "const fs = require('fs');\nimport { x } from \"./utils/format\";\n";
        let deps = classifier().extract_dependencies(content);
        assert_eq!(deps, vec!["./utils/format".to_string(), "fs".to_string()]);
    }

    #[test]
    fn test_extract_exports_with_default() {
        let content = "export const Button = 1;\nexport interface ButtonProps {}\nexport default Button;\n";
        let exports = classifier().extract_exports(content);
        assert_eq!(
            exports,
            vec![
                "Button".to_string(),
                "ButtonProps".to_string(),
                "default:Button".to_string()
            ]
        );
    }

    #[test]
    fn test_pattern_tags_are_independent() {
        let content = "import React from 'react';\ninterface P {}\nconst c = 'liquid-glass';";
        let tags = identify_patterns(content);
        assert!(tags.contains(&"react-component-pattern".to_string()));
        assert!(tags.contains(&"liquid-glass-pattern".to_string()));
        assert!(!tags.contains(&"code-connect-pattern".to_string()));
    }

    #[test]
    fn test_compliance_checklist() {
        let content = "font-family: 'SF Pro'; min-height: 44px; color: #007AFF; @media (prefers-color-scheme: dark) {}";
        let report = assess_compliance(content);
        assert_eq!(report.score, 20 + 15 + 20 + 10 + 20);
        assert_eq!(report.max_score, 100);
        assert!(report.checks.contains(&"Dark mode support".to_string()));
        assert!(!report.checks.contains(&"Accessibility attributes".to_string()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// 分类对任意路径与内容都是全函数，且与首个命中规则一致
        #[test]
        fn prop_categorize_is_total_and_ordered(
            path in "[a-zA-Z/_.-]{1,40}",
            content in "[ -~\n]{0,200}"
        ) {
            let category = categorize(&path, &content);
            match matching_rule(&path) {
                None => prop_assert_eq!(category, Category::SystemComponent),
                Some("token") => prop_assert!(matches!(
                    category,
                    Category::DesignTokenTypes
                        | Category::DesignTokenDefinitions
                        | Category::TokenSystem
                )),
                Some(_) => prop_assert!(!matches!(
                    category,
                    Category::DesignTokenTypes
                        | Category::DesignTokenDefinitions
                        | Category::TokenSystem
                )),
            }
        }

        /// 合规得分等于通过检查项的分值之和且不超过满分
        #[test]
        fn prop_compliance_score_bounded(content in "[ -~\n]{0,300}") {
            let report = assess_compliance(&content);
            prop_assert!(report.score <= COMPLIANCE_MAX_SCORE);
            prop_assert!(report.checks.len() <= COMPLIANCE_CHECKS.len());
        }
    }
}
