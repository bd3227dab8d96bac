// ============================================================================
// 模式学习服务：从足够复杂的内容文件中提取结构指纹，按模式族分桶
// ✅ 只能做：对单个文件内容做只读的子串/正则判断
// ⛔ 禁止：跨文件共享可变状态（合并由调用方在批次 join 后完成）
// ============================================================================

use regex::Regex;

use crate::models::dtos::FileRecord;
use crate::models::patterns::{
    ComponentFingerprint, DesignSystemFingerprint, ExportStyle, LearnedPatterns, PatternLibrary,
    StyleFingerprint, StyleLanguage, TokenFingerprint, UtilityFingerprint, ValidationFingerprint,
};
use crate::services::batch::BatchRunner;
use crate::utils::error::{AppError, AppResult};

/// 合规得分超过该值的文件进入 compliance 模式族
const COMPLIANCE_FAMILY_MIN_SCORE: u32 = 50;

/// 模式学习器：持有各指纹用到的预编译正则
pub struct PatternLearner {
    threshold: usize,
    re_colors: Regex,
    re_spacing: Regex,
    re_typography: Regex,
    re_animations: Regex,
    re_shadows: Regex,
    re_glass: Regex,
    re_token_value: Regex,
    re_hooks: Regex,
    re_component_fns: Regex,
    re_helper_fns: Regex,
    re_validation_fns: Regex,
}

impl PatternLearner {
    /// `threshold`：复杂度严格大于该值的内容文件才参与学习
    pub fn new(threshold: usize) -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::ConfigError(format!("正则编译失败：{}", e)))
        };

        Ok(Self {
            threshold,
            re_colors: compile(r"color|Color|#[0-9a-fA-F]{6}|rgb|hsl")?,
            re_spacing: compile(r"spacing|margin|padding|\d+px|\d+rem")?,
            re_typography: compile(r"font|typography|text|heading")?,
            re_animations: compile(r"animation|transition|duration")?,
            re_shadows: compile(r"shadow|box-shadow|elevation")?,
            re_glass: compile(r"glass|blur|backdrop-filter")?,
            re_token_value: compile(r#":\s*['"`]"#)?,
            re_hooks: compile(r"use[A-Z]")?,
            re_component_fns: compile(r"function|const.*=>")?,
            re_helper_fns: compile(r"export\s+(const|function)")?,
            re_validation_fns: compile(r"validate|check|verify")?,
        })
    }

    /// 是否参与学习
    pub fn qualifies(&self, record: &FileRecord) -> bool {
        record.has_content() && record.complexity.score > self.threshold
    }

    /// 分批并发学习全部合格文件，join 后按路径写入指纹库；返回执行的批次数
    pub fn learn_all(
        &self,
        runner: &BatchRunner,
        records: &[&FileRecord],
        library: &mut PatternLibrary,
    ) -> usize {
        let qualifying: Vec<&FileRecord> = records
            .iter()
            .copied()
            .filter(|record| self.qualifies(record))
            .collect();

        log::info!(
            "模式学习：{} 个内容文件中有 {} 个复杂度超过 {}",
            records.len(),
            qualifying.len(),
            self.threshold
        );

        let (learned, batches) = runner.run(&qualifying, |record| {
            (record.relative_path.clone(), self.learn_from_file(record))
        });

        for (relative_path, patterns) in learned {
            library.insert(&relative_path, patterns);
        }

        batches
    }

    /// 单个文件的指纹；按分类名称子串决定所属模式族，可同时属于多个
    pub fn learn_from_file(&self, record: &FileRecord) -> LearnedPatterns {
        let content = record.content.as_str();
        let label = record.category.label();
        let mut learned = LearnedPatterns::default();

        if label.contains("Token") {
            learned.token = Some(self.extract_token_structure(content));
        }
        if label.contains("Component") {
            learned.component = Some(self.extract_component_structure(content));
        }
        if label.contains("Style") || label.contains("SCSS") {
            learned.style = Some(extract_style_structure(content));
        }
        if label.contains("Utility") {
            learned.utility = Some(self.extract_utility_structure(content));
        }
        if label.contains("Validation") {
            learned.validation = Some(self.extract_validation_structure(content));
        }
        if label.contains("Design Token") || label.contains("Token System") {
            learned.design_system = Some(DesignSystemFingerprint {
                token_structure: self.extract_token_structure(content),
                compliance: record.compliance.clone(),
            });
        }
        if record.compliance.score > COMPLIANCE_FAMILY_MIN_SCORE {
            learned.compliance = Some(record.compliance.clone());
        }

        learned
    }

    pub fn extract_token_structure(&self, content: &str) -> TokenFingerprint {
        TokenFingerprint {
            has_colors: self.re_colors.is_match(content),
            has_spacing: self.re_spacing.is_match(content),
            has_typography: self.re_typography.is_match(content),
            has_animations: self.re_animations.is_match(content),
            has_shadows: self.re_shadows.is_match(content),
            has_glass_effects: self.re_glass.is_match(content),
            export_style: if content.contains("export const") {
                ExportStyle::Const
            } else if content.contains("export default") {
                ExportStyle::Default
            } else {
                ExportStyle::Named
            },
            token_count: self.re_token_value.find_iter(content).count(),
            has_interfaces: content.contains("interface"),
            has_types: content.contains("type "),
            is_es_module: content.contains("export") && !content.contains("module.exports"),
        }
    }

    pub fn extract_component_structure(&self, content: &str) -> ComponentFingerprint {
        ComponentFingerprint {
            is_react_component: content.contains("React") || content.contains("jsx"),
            has_props: content.contains("interface") && content.contains("Props"),
            has_state: content.contains("useState") || content.contains("state"),
            has_hooks: self.re_hooks.is_match(content),
            export_style: if content.contains("export default") {
                ExportStyle::Default
            } else {
                ExportStyle::Named
            },
            complexity: self.re_component_fns.find_iter(content).count(),
            has_code_connect: content.contains("figma.connect"),
            has_accessibility: content.contains("aria-") || content.contains("role="),
            is_es_module: content.contains("import") && !content.contains("require("),
        }
    }

    pub fn extract_utility_structure(&self, content: &str) -> UtilityFingerprint {
        UtilityFingerprint {
            has_helper_functions: self.re_helper_fns.is_match(content),
            has_types: content.contains("interface") || content.contains("type "),
            is_modular: content.contains("export") && !content.contains("export default"),
            complexity: content.matches("export").count(),
            is_es_module: content.contains("import") && !content.contains("require("),
        }
    }

    pub fn extract_validation_structure(&self, content: &str) -> ValidationFingerprint {
        ValidationFingerprint {
            has_validation_functions: self.re_validation_fns.is_match(content),
            has_error_handling: content.contains("try") && content.contains("catch"),
            has_async_validation: content.contains("async") && content.contains("validate"),
            has_types: content.contains("ValidationResult") || content.contains("interface"),
            has_guideline_validation: content.contains("HIG") || content.contains("apple"),
            is_es_module: content.contains("import") && !content.contains("require("),
        }
    }
}

/// 样式指纹只依赖子串判断
pub fn extract_style_structure(content: &str) -> StyleFingerprint {
    StyleFingerprint {
        has_variables: content.contains('$') || content.contains("--"),
        has_mixins: content.contains("@mixin"),
        has_media_queries: content.contains("@media"),
        has_nesting: content.contains('&'),
        has_glass_effects: content.contains("glassmorphism") || content.contains("backdrop-filter"),
        has_spatial_styles: content.contains("quantum") || content.contains("liquid-glass"),
        language: if content.contains('$') {
            StyleLanguage::Scss
        } else {
            StyleLanguage::Css
        },
    }
}

// ============================================================================
// 单元测试
// ============================================================================
