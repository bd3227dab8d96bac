// ============================================================================
// 相对路径工具：统一使用正斜杠分隔的相对路径字符串
// 扫描、推断、规划各阶段都以这种字符串作为表的键
// ============================================================================

use std::path::Path;

/// 将 Path 转换为正斜杠分隔的字符串
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// 拼接相对路径（父路径为空时直接返回名称）
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// 文件名（含扩展名）
pub fn file_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// 扩展名，带前导点（如 ".ts"）；无扩展名时返回空串
///
/// 与 Node 的 `path.extname` 保持一致：`.gitignore` 之类以点开头的文件名没有扩展名。
pub fn extension(relative_path: &str) -> &str {
    let name = file_name(relative_path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// 去掉扩展名的文件名（如 "format.helper.ts" → "format.helper"）
pub fn base_name(relative_path: &str) -> &str {
    let name = file_name(relative_path);
    let ext = extension(relative_path);
    &name[..name.len() - ext.len()]
}

/// 所在目录的相对路径；位于根目录时返回空串
pub fn directory(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => "",
    }
}

/// 所在目录的最后一段名称（如 "src/tokens/colors.ts" → "tokens"）
pub fn parent_dir_name(relative_path: &str) -> &str {
    file_name(directory(relative_path))
}

/// 路径深度：按 '/' 切分后的段数
pub fn depth(relative_path: &str) -> usize {
    relative_path.split('/').count()
}
