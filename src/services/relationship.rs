// ============================================================================
// 关系映射服务：为每个内容文件建立启发式的导入/导出/被依赖/相关骨架关系
// 两两比较，O(N²)；规模过大时只告警不截断
// ============================================================================

use std::collections::BTreeMap;

use crate::models::dtos::{FileRecord, Intention, RelationshipEdge};
use crate::services::RELATIONSHIP_SCALE_WARNING;

/// 建立全部内容文件的关系边
///
/// `intentions` 以骨架文件相对路径为键，用于反查相关骨架。
pub fn map_relationships(
    content: &BTreeMap<String, FileRecord>,
    intentions: &BTreeMap<String, Intention>,
) -> BTreeMap<String, RelationshipEdge> {
    let comparisons = content.len().saturating_mul(content.len() + intentions.len());
    if comparisons > RELATIONSHIP_SCALE_WARNING {
        log::warn!(
            "关系映射规模较大：{} 个内容文件 × {} 个候选，共 {} 次比较",
            content.len(),
            content.len() + intentions.len(),
            comparisons
        );
    }

    let mut edges = BTreeMap::new();

    for (relative_path, record) in content {
        let edge = RelationshipEdge {
            imports: record.dependencies.clone(),
            exports: record.exports.clone(),
            dependents: find_dependents(relative_path, record.base_name(), content),
            related_skeleton: find_related_skeletons(relative_path, intentions),
        };
        edges.insert(relative_path.clone(), edge);
    }

    log::info!("关系映射完成：{} 个内容文件", edges.len());
    edges
}

/// 依赖说明符中包含本文件基础名的其他内容文件
fn find_dependents(relative_path: &str, base_name: &str, content: &BTreeMap<String, FileRecord>) -> Vec<String> {
    content
        .iter()
        .filter(|(other_path, _)| other_path.as_str() != relative_path)
        .filter(|(_, other)| other.dependencies.iter().any(|dep| dep.contains(base_name)))
        .map(|(other_path, _)| other_path.clone())
        .collect()
}

/// 意图中把本文件列为相关文件的骨架文件
fn find_related_skeletons(relative_path: &str, intentions: &BTreeMap<String, Intention>) -> Vec<String> {
    intentions
        .iter()
        .filter(|(_, intention)| intention.related_files.iter().any(|f| f == relative_path))
        .map(|(skeleton_path, _)| skeleton_path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dtos::{Category, ComplexityMetrics, ComplianceReport};
    use crate::utils::path;
    use std::path::PathBuf;

    fn content_record(relative_path: &str, dependencies: &[&str]) -> FileRecord {
        FileRecord {
            path: PathBuf::from("/project").join(relative_path),
            relative_path: relative_path.to_string(),
            size: 10,
            modified: 0,
            extension: path::extension(relative_path).to_string(),
            directory: path::directory(relative_path).to_string(),
            content: "export const x = 1;".to_string(),
            content_hash: None,
            category: Category::UtilitySystem,
            complexity: ComplexityMetrics::default(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            exports: vec!["x".to_string()],
            patterns: Vec::new(),
            compliance: ComplianceReport::default(),
        }
    }

    #[test]
    fn test_dependents_and_related_skeletons() {
        let mut content = BTreeMap::new();
        for record in [
            content_record("utils/format.ts", &[]),
            content_record("components/Date.tsx", &["../utils/format"]),
            content_record("components/Plain.tsx", &["react"]),
        ] {
            content.insert(record.relative_path.clone(), record);
        }

        let mut intentions = BTreeMap::new();
        intentions.insert(
            "utils/format.helper.ts".to_string(),
            Intention {
                related_files: vec!["utils/format.ts".to_string()],
                ..Intention::default()
            },
        );

        let edges = map_relationships(&content, &intentions);

        assert_eq!(edges.len(), 3);
        let format = &edges["utils/format.ts"];
        assert_eq!(format.dependents, vec!["components/Date.tsx".to_string()]);
        assert_eq!(format.related_skeleton, vec!["utils/format.helper.ts".to_string()]);
        assert_eq!(format.exports, vec!["x".to_string()]);
        assert!(edges["components/Plain.tsx"].dependents.is_empty());
        assert_eq!(edges["components/Date.tsx"].imports, vec!["../utils/format".to_string()]);
    }

    #[test]
    fn test_file_is_not_its_own_dependent() {
        let mut content = BTreeMap::new();
        let record = content_record("lib/self.ts", &["./self"]);
        content.insert(record.relative_path.clone(), record);

        let edges = map_relationships(&content, &BTreeMap::new());
        assert!(edges["lib/self.ts"].dependents.is_empty());
    }
}
