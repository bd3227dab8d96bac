// ============================================================================
// 模板注册表
// ============================================================================
//
// 使用策略模式：执行器只依赖 TemplateRegistry trait，按模板 id 取得静态文本。
// 未注册的 id 返回 None，由执行器记为 skipped-no-template，永不 panic。
// 内置实现 BuiltinTemplates 以声明式表格描述每个模板，新增模板只需追加表项。

// ============================================================================
// 注册表 Trait 定义
// ============================================================================

/// 模板 id → 静态文本生成器
pub trait TemplateRegistry: Sync {
    /// 生成模板文本；id 未注册时返回 None
    fn generate(&self, template_id: &str) -> Option<String>;

    /// id 是否已注册
    fn contains(&self, template_id: &str) -> bool {
        self.generate(template_id).is_some()
    }
}

// ============================================================================
// 模板描述
// ============================================================================

type Entries = &'static [(&'static str, &'static str)];

enum TemplateKind {
    /// `export const <export> = { ... } as const` 形式的令牌模块
    Tokens {
        export: &'static str,
        type_name: &'static str,
        entries: Entries,
    },
    /// 函数式 React 组件
    Component {
        name: &'static str,
        element: &'static str,
        class_name: &'static str,
    },
    /// Context + Provider 组件
    Provider { name: &'static str, value: &'static str },
    /// React hook
    Hook {
        name: &'static str,
        returns: &'static str,
    },
    /// 原样输出
    Text(&'static str),
}

struct TemplateSpec {
    id: &'static str,
    kind: TemplateKind,
}

const BUILTIN: &[TemplateSpec] = &[
    // ---- 通用 ----
    TemplateSpec {
        id: "index-exports-esm",
        kind: TemplateKind::Text("// Barrel file: re-export public modules of this directory.\nexport {};\n"),
    },
    TemplateSpec {
        id: "design-token-definitions-esm",
        kind: TemplateKind::Tokens {
            export: "tokens",
            type_name: "DesignToken",
            entries: &[("spacingUnit", "8px"), ("radius", "12px"), ("fontFamily", "SF Pro Text, system-ui")],
        },
    },
    TemplateSpec {
        id: "react-component-esm",
        kind: TemplateKind::Component {
            name: "Component",
            element: "div",
            class_name: "component",
        },
    },
    TemplateSpec {
        id: "icon-component-esm",
        kind: TemplateKind::Text(
            "import React from 'react';\n\nexport interface IconProps {\n  size?: number;\n  label?: string;\n}\n\nexport const Icon: React.FC<IconProps> = ({ size = 24, label }) => (\n  <svg width={size} height={size} role=\"img\" aria-label={label} viewBox=\"0 0 24 24\" />\n);\n\nexport default Icon;\n",
        ),
    },
    TemplateSpec {
        id: "utility-functions-esm",
        kind: TemplateKind::Text(
            "export const clamp = (value: number, min: number, max: number): number =>\n  Math.min(Math.max(value, min), max);\n\nexport const isDefined = <T>(value: T | null | undefined): value is T =>\n  value !== null && value !== undefined;\n",
        ),
    },
    TemplateSpec {
        id: "validation-functions-esm",
        kind: TemplateKind::Text(
            "export interface ValidationResult {\n  valid: boolean;\n  errors: string[];\n}\n\nexport const validateRequired = (value: unknown, field: string): ValidationResult => {\n  const valid = value !== undefined && value !== null && value !== '';\n  return { valid, errors: valid ? [] : [`${field} is required`] };\n};\n",
        ),
    },
    TemplateSpec {
        id: "code-connect-esm",
        kind: TemplateKind::Text(
            "import figma from '@figma/code-connect';\n\nexport const integrationConfig = {\n  url: '',\n  props: {},\n};\n\nexport default figma;\n",
        ),
    },
    TemplateSpec {
        id: "basic-typescript-esm",
        kind: TemplateKind::Text("export const moduleName = '';\n\nexport default {};\n"),
    },
    // ---- 令牌 ----
    TemplateSpec {
        id: "token-colors-esm",
        kind: TemplateKind::Tokens {
            export: "colors",
            type_name: "ColorToken",
            entries: &[("systemBlue", "#007AFF"), ("systemGreen", "#34C759"), ("systemRed", "#FF3B30"), ("label", "#000000")],
        },
    },
    TemplateSpec {
        id: "token-animations-esm",
        kind: TemplateKind::Tokens {
            export: "animations",
            type_name: "AnimationToken",
            entries: &[("durationFast", "150ms"), ("durationBase", "250ms"), ("easeOut", "cubic-bezier(0.16, 1, 0.3, 1)")],
        },
    },
    TemplateSpec {
        id: "token-effects-esm",
        kind: TemplateKind::Tokens {
            export: "effects",
            type_name: "EffectToken",
            entries: &[("shadowSmall", "0 1px 3px rgba(0, 0, 0, 0.12)"), ("blur", "blur(20px)")],
        },
    },
    TemplateSpec {
        id: "token-gradients-esm",
        kind: TemplateKind::Tokens {
            export: "gradients",
            type_name: "GradientToken",
            entries: &[("primary", "linear-gradient(135deg, #007AFF, #5856D6)")],
        },
    },
    TemplateSpec {
        id: "token-apple-hig-esm",
        kind: TemplateKind::Tokens {
            export: "higTokens",
            type_name: "HigToken",
            entries: &[("minTouchTarget", "44px"), ("fontFamily", "SF Pro Text, system-ui"), ("cornerRadius", "10px")],
        },
    },
    TemplateSpec {
        id: "token-accessibility-esm",
        kind: TemplateKind::Tokens {
            export: "accessibility",
            type_name: "AccessibilityToken",
            entries: &[("focusRing", "0 0 0 3px rgba(0, 122, 255, 0.5)"), ("minContrast", "4.5")],
        },
    },
    TemplateSpec {
        id: "token-responsive-esm",
        kind: TemplateKind::Tokens {
            export: "breakpoints",
            type_name: "Breakpoint",
            entries: &[("sm", "640px"), ("md", "768px"), ("lg", "1024px"), ("xl", "1280px")],
        },
    },
    TemplateSpec {
        id: "token-theme-ecommerce-esm",
        kind: TemplateKind::Tokens {
            export: "ecommerceTheme",
            type_name: "EcommerceThemeToken",
            entries: &[("accent", "#FF9500"), ("price", "#1C1C1E")],
        },
    },
    TemplateSpec {
        id: "token-theme-enterprise-esm",
        kind: TemplateKind::Tokens {
            export: "enterpriseTheme",
            type_name: "EnterpriseThemeToken",
            entries: &[("accent", "#0A84FF"), ("surface", "#F2F2F7")],
        },
    },
    TemplateSpec {
        id: "token-theme-gaming-esm",
        kind: TemplateKind::Tokens {
            export: "gamingTheme",
            type_name: "GamingThemeToken",
            entries: &[("accent", "#BF5AF2"), ("surface", "#000000")],
        },
    },
    // ---- 组件 ----
    TemplateSpec {
        id: "component-navigation-esm",
        kind: TemplateKind::Component {
            name: "Navigation",
            element: "nav",
            class_name: "navigation",
        },
    },
    TemplateSpec {
        id: "component-grid-esm",
        kind: TemplateKind::Component {
            name: "Grid",
            element: "div",
            class_name: "grid",
        },
    },
    TemplateSpec {
        id: "component-container-esm",
        kind: TemplateKind::Component {
            name: "Container",
            element: "div",
            class_name: "container",
        },
    },
    TemplateSpec {
        id: "component-layout-esm",
        kind: TemplateKind::Component {
            name: "Layout",
            element: "main",
            class_name: "layout",
        },
    },
    TemplateSpec {
        id: "component-section-esm",
        kind: TemplateKind::Component {
            name: "Section",
            element: "section",
            class_name: "section",
        },
    },
    TemplateSpec {
        id: "component-sidebar-esm",
        kind: TemplateKind::Component {
            name: "Sidebar",
            element: "aside",
            class_name: "sidebar",
        },
    },
    TemplateSpec {
        id: "component-quantum-spatial-esm",
        kind: TemplateKind::Component {
            name: "SpatialSurface",
            element: "div",
            class_name: "spatial-surface",
        },
    },
    TemplateSpec {
        id: "component-glass-esm",
        kind: TemplateKind::Component {
            name: "GlassPanel",
            element: "div",
            class_name: "glass-panel",
        },
    },
    TemplateSpec {
        id: "component-apple-navigation-esm",
        kind: TemplateKind::Component {
            name: "TabBar",
            element: "nav",
            class_name: "tab-bar",
        },
    },
    TemplateSpec {
        id: "component-breakpoints-esm",
        kind: TemplateKind::Component {
            name: "BreakpointDebugger",
            element: "div",
            class_name: "breakpoint-debugger",
        },
    },
    TemplateSpec {
        id: "component-media-queries-esm",
        kind: TemplateKind::Component {
            name: "MediaQuery",
            element: "div",
            class_name: "media-query",
        },
    },
    TemplateSpec {
        id: "component-responsive-esm",
        kind: TemplateKind::Component {
            name: "Responsive",
            element: "div",
            class_name: "responsive",
        },
    },
    TemplateSpec {
        id: "example-component-esm",
        kind: TemplateKind::Component {
            name: "Example",
            element: "div",
            class_name: "example",
        },
    },
    TemplateSpec {
        id: "provider-theme-esm",
        kind: TemplateKind::Provider {
            name: "Theme",
            value: "{ mode: 'light' as 'light' | 'dark' }",
        },
    },
    TemplateSpec {
        id: "provider-responsive-esm",
        kind: TemplateKind::Provider {
            name: "Responsive",
            value: "{ breakpoint: 'md' }",
        },
    },
    // ---- Hooks ----
    TemplateSpec {
        id: "hook-breakpoint-esm",
        kind: TemplateKind::Hook {
            name: "useBreakpoint",
            returns: "'md'",
        },
    },
    TemplateSpec {
        id: "hook-design-system-esm",
        kind: TemplateKind::Hook {
            name: "useDesignSystem",
            returns: "{ tokens: {} }",
        },
    },
    TemplateSpec {
        id: "hook-responsive-esm",
        kind: TemplateKind::Hook {
            name: "useResponsive",
            returns: "{ isMobile: false }",
        },
    },
    TemplateSpec {
        id: "hook-theme-esm",
        kind: TemplateKind::Hook {
            name: "useTheme",
            returns: "{ mode: 'light' }",
        },
    },
    TemplateSpec {
        id: "hook-tokens-esm",
        kind: TemplateKind::Hook {
            name: "useTokens",
            returns: "{}",
        },
    },
    TemplateSpec {
        id: "hook-generic-esm",
        kind: TemplateKind::Hook {
            name: "useValue",
            returns: "null",
        },
    },
    // ---- 样式 ----
    TemplateSpec {
        id: "scss-variables",
        kind: TemplateKind::Text("$spacing-unit: 8px;\n$radius: 12px;\n$font-family: 'SF Pro Text', system-ui, sans-serif;\n"),
    },
    TemplateSpec {
        id: "scss-mixins",
        kind: TemplateKind::Text("@mixin touch-target {\n  min-width: 44px;\n  min-height: 44px;\n}\n"),
    },
    TemplateSpec {
        id: "scss-responsive",
        kind: TemplateKind::Text("@mixin above($width) {\n  @media (min-width: $width) {\n    @content;\n  }\n}\n"),
    },
    TemplateSpec {
        id: "scss-system",
        kind: TemplateKind::Text("$base-color: #007AFF;\n\n.system {\n  color: $base-color;\n}\n"),
    },
    TemplateSpec {
        id: "css-apple-hig",
        kind: TemplateKind::Text(":root {\n  --font-family: 'SF Pro Text', system-ui;\n  --min-touch-target: 44px;\n}\n"),
    },
    TemplateSpec {
        id: "css-global",
        kind: TemplateKind::Text("*, *::before, *::after {\n  box-sizing: border-box;\n}\n\nbody {\n  margin: 0;\n}\n"),
    },
    TemplateSpec {
        id: "css-liquid-glass",
        kind: TemplateKind::Text(".liquid-glass {\n  background: rgba(255, 255, 255, 0.6);\n  backdrop-filter: blur(20px);\n}\n"),
    },
    TemplateSpec {
        id: "css-responsive",
        kind: TemplateKind::Text(".container {\n  width: 100%;\n}\n\n@media (min-width: 768px) {\n  .container {\n    max-width: 720px;\n  }\n}\n"),
    },
    TemplateSpec {
        id: "css-component",
        kind: TemplateKind::Text(".component {\n  display: block;\n}\n"),
    },
    TemplateSpec {
        id: "css-system",
        kind: TemplateKind::Text(":root {\n  --color-primary: #007AFF;\n}\n"),
    },
    // ---- 测试 ----
    TemplateSpec {
        id: "jest-config",
        kind: TemplateKind::Text("module.exports = {\n  testEnvironment: 'jsdom',\n};\n"),
    },
    TemplateSpec {
        id: "test-setup-esm",
        kind: TemplateKind::Text("import '@testing-library/jest-dom';\n"),
    },
    TemplateSpec {
        id: "test-component-esm",
        kind: TemplateKind::Text(
            "import { render } from '@testing-library/react';\n\ndescribe('component', () => {\n  it('renders', () => {\n    expect(render).toBeDefined();\n  });\n});\n",
        ),
    },
    // ---- 工具与目录 ----
    TemplateSpec {
        id: "tool-generator-esm",
        kind: TemplateKind::Text("export async function generate(): Promise<void> {\n  // generation steps\n}\n"),
    },
    TemplateSpec {
        id: "tool-validator-esm",
        kind: TemplateKind::Text("export async function validate(): Promise<boolean> {\n  return true;\n}\n"),
    },
    TemplateSpec {
        id: "tool-script-esm",
        kind: TemplateKind::Text("export async function main(): Promise<void> {}\n\nmain();\n"),
    },
    TemplateSpec {
        id: "catalog-json",
        kind: TemplateKind::Text("{\n  \"entries\": []\n}\n"),
    },
    TemplateSpec {
        id: "catalog-markdown",
        kind: TemplateKind::Text("# Catalog\n\n| Name | Description |\n|------|-------------|\n"),
    },
];

impl TemplateKind {
    fn render(&self) -> String {
        match self {
            TemplateKind::Tokens {
                export,
                type_name,
                entries,
            } => {
                let body: String = entries
                    .iter()
                    .map(|(key, value)| format!("  {}: '{}',\n", key, value))
                    .collect();
                format!(
                    "export const {export} = {{\n{body}}} as const;\n\nexport type {type_name} = keyof typeof {export};\n\nexport default {export};\n"
                )
            }
            TemplateKind::Component {
                name,
                element,
                class_name,
            } => format!(
                "import React from 'react';\n\nexport interface {name}Props {{\n  children?: React.ReactNode;\n  className?: string;\n}}\n\nexport const {name}: React.FC<{name}Props> = ({{ children, className = '' }}) => (\n  <{element} className={{`{class_name} ${{className}}`}}>{{children}}</{element}>\n);\n\nexport default {name};\n"
            ),
            TemplateKind::Provider { name, value } => format!(
                "import React, {{ createContext, useContext }} from 'react';\n\nconst defaultValue = {value};\n\nexport const {name}Context = createContext(defaultValue);\n\nexport const {name}Provider: React.FC<{{ children?: React.ReactNode }}> = ({{ children }}) => (\n  <{name}Context.Provider value={{defaultValue}}>{{children}}</{name}Context.Provider>\n);\n\nexport const use{name}Context = () => useContext({name}Context);\n"
            ),
            TemplateKind::Hook { name, returns } => format!(
                "import {{ useMemo }} from 'react';\n\nexport function {name}() {{\n  return useMemo(() => {returns}, []);\n}}\n\nexport default {name};\n"
            ),
            TemplateKind::Text(text) => text.to_string(),
        }
    }
}

// ============================================================================
// 内置实现
// ============================================================================

/// 内置模板注册表
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    /// 全部已注册的模板 id（按注册顺序）
    pub fn ids() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|spec| spec.id)
    }
}

impl TemplateRegistry for BuiltinTemplates {
    fn generate(&self, template_id: &str) -> Option<String> {
        BUILTIN
            .iter()
            .find(|spec| spec.id == template_id)
            .map(|spec| spec.kind.render())
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: Vec<&str> = BuiltinTemplates::ids().collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_every_builtin_generates_non_empty_text() {
        for id in BuiltinTemplates::ids() {
            let text = BuiltinTemplates.generate(id).unwrap();
            assert!(!text.is_empty(), "模板 {} 生成了空文本", id);
        }
    }

    #[test]
    fn test_unregistered_ids() {
        // 意图表里的建议值 basic 与 style-definitions 没有对应的生成器
        assert!(!BuiltinTemplates.contains("basic"));
        assert!(!BuiltinTemplates.contains("style-definitions"));
        assert!(BuiltinTemplates.generate("no-such-template").is_none());
    }

    #[test]
    fn test_token_template_rendering() {
        let text = BuiltinTemplates.generate("token-colors-esm").unwrap();
        assert!(text.starts_with("export const colors = {\n"));
        assert!(text.contains("  systemBlue: '#007AFF',\n"));
        assert!(text.contains("export type ColorToken = keyof typeof colors;"));
    }

    #[test]
    fn test_component_template_rendering() {
        let text = BuiltinTemplates.generate("component-navigation-esm").unwrap();
        assert!(text.contains("export const Navigation: React.FC<NavigationProps>"));
        assert!(text.contains("<nav className={`navigation ${className}`}>{children}</nav>"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = BuiltinTemplates.generate("provider-theme-esm");
        let second = BuiltinTemplates.generate("provider-theme-esm");
        assert_eq!(first, second);
    }
}
