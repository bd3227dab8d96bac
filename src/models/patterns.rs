// ============================================================================
// 模式指纹定义
// 每个模式族一种指纹结构，均以内容文件的相对路径为键存入 PatternLibrary
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::dtos::ComplianceReport;

/// 导出风格
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    Const,
    Default,
    Named,
}

/// 样式语言
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StyleLanguage {
    Scss,
    Css,
}

/// 设计令牌文件指纹
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenFingerprint {
    pub has_colors: bool,
    pub has_spacing: bool,
    pub has_typography: bool,
    pub has_animations: bool,
    pub has_shadows: bool,
    pub has_glass_effects: bool,
    pub export_style: ExportStyle,
    /// `key: '...'` 形式的令牌数量
    pub token_count: usize,
    pub has_interfaces: bool,
    pub has_types: bool,
    pub is_es_module: bool,
}

/// 组件文件指纹
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ComponentFingerprint {
    pub is_react_component: bool,
    pub has_props: bool,
    pub has_state: bool,
    pub has_hooks: bool,
    pub export_style: ExportStyle,
    /// 函数与箭头函数声明数量
    pub complexity: usize,
    pub has_code_connect: bool,
    pub has_accessibility: bool,
    pub is_es_module: bool,
}

/// 样式文件指纹
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StyleFingerprint {
    pub has_variables: bool,
    pub has_mixins: bool,
    pub has_media_queries: bool,
    pub has_nesting: bool,
    pub has_glass_effects: bool,
    pub has_spatial_styles: bool,
    pub language: StyleLanguage,
}

/// 工具函数文件指纹
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UtilityFingerprint {
    pub has_helper_functions: bool,
    pub has_types: bool,
    pub is_modular: bool,
    /// export 出现次数
    pub complexity: usize,
    pub is_es_module: bool,
}

/// 校验文件指纹
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ValidationFingerprint {
    pub has_validation_functions: bool,
    pub has_error_handling: bool,
    pub has_async_validation: bool,
    pub has_types: bool,
    pub has_guideline_validation: bool,
    pub is_es_module: bool,
}

/// 设计系统指纹：令牌结构 + 合规结果
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DesignSystemFingerprint {
    pub token_structure: TokenFingerprint,
    pub compliance: ComplianceReport,
}

/// 模式族
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum PatternFamily {
    Token,
    Component,
    Style,
    Utility,
    Validation,
    DesignSystem,
    Compliance,
}

impl PatternFamily {
    pub const ALL: [PatternFamily; 7] = [
        PatternFamily::Token,
        PatternFamily::Component,
        PatternFamily::Style,
        PatternFamily::Utility,
        PatternFamily::Validation,
        PatternFamily::DesignSystem,
        PatternFamily::Compliance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternFamily::Token => "token",
            PatternFamily::Component => "component",
            PatternFamily::Style => "style",
            PatternFamily::Utility => "utility",
            PatternFamily::Validation => "validation",
            PatternFamily::DesignSystem => "design-system",
            PatternFamily::Compliance => "compliance",
        }
    }
}

/// 单个文件学到的指纹（一个文件可以同时属于多个模式族）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LearnedPatterns {
    pub token: Option<TokenFingerprint>,
    pub component: Option<ComponentFingerprint>,
    pub style: Option<StyleFingerprint>,
    pub utility: Option<UtilityFingerprint>,
    pub validation: Option<ValidationFingerprint>,
    pub design_system: Option<DesignSystemFingerprint>,
    pub compliance: Option<ComplianceReport>,
}

/// 按模式族分桶的指纹库
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PatternLibrary {
    pub token: BTreeMap<String, TokenFingerprint>,
    pub component: BTreeMap<String, ComponentFingerprint>,
    pub style: BTreeMap<String, StyleFingerprint>,
    pub utility: BTreeMap<String, UtilityFingerprint>,
    pub validation: BTreeMap<String, ValidationFingerprint>,
    pub design_system: BTreeMap<String, DesignSystemFingerprint>,
    pub compliance: BTreeMap<String, ComplianceReport>,
}

impl PatternLibrary {
    /// 将单个文件的指纹按键写入各个桶
    pub fn insert(&mut self, relative_path: &str, learned: LearnedPatterns) {
        let key = relative_path.to_string();
        if let Some(fp) = learned.token {
            self.token.insert(key.clone(), fp);
        }
        if let Some(fp) = learned.component {
            self.component.insert(key.clone(), fp);
        }
        if let Some(fp) = learned.style {
            self.style.insert(key.clone(), fp);
        }
        if let Some(fp) = learned.utility {
            self.utility.insert(key.clone(), fp);
        }
        if let Some(fp) = learned.validation {
            self.validation.insert(key.clone(), fp);
        }
        if let Some(fp) = learned.design_system {
            self.design_system.insert(key.clone(), fp);
        }
        if let Some(report) = learned.compliance {
            self.compliance.insert(key, report);
        }
    }

    /// 指定模式族的记录数
    pub fn count(&self, family: PatternFamily) -> usize {
        match family {
            PatternFamily::Token => self.token.len(),
            PatternFamily::Component => self.component.len(),
            PatternFamily::Style => self.style.len(),
            PatternFamily::Utility => self.utility.len(),
            PatternFamily::Validation => self.validation.len(),
            PatternFamily::DesignSystem => self.design_system.len(),
            PatternFamily::Compliance => self.compliance.len(),
        }
    }

    /// 各模式族的记录数（按固定顺序）
    pub fn counts(&self) -> BTreeMap<PatternFamily, usize> {
        PatternFamily::ALL
            .iter()
            .map(|family| (*family, self.count(*family)))
            .collect()
    }
}
