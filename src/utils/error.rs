// ============================================================================
// 统一错误类型定义
// 使用 thiserror 派生宏；commands 层统一转换为 String
// ============================================================================

use thiserror::Error;

/// 应用统一错误枚举
///
/// 只有"致命"错误才会以 `AppError` 的形式向上传播；
/// 单个目录/文件/写入失败都在服务层内部记录日志并恢复，不会变成 `Err`。
/// 通过 `impl From<AppError> for String` 保持与 commands 层 `Result<T, String>` 的兼容性。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置无效（如根路径列表为空、并发数为 0、配置文件格式错误）
    #[error("配置无效：{0}")]
    ConfigError(String),

    /// 单个文件的读取错误（扫描器记录日志后跳过该文件）
    #[error("扫描失败：{0}")]
    ScanError(String),

    /// 文件系统 IO 错误
    #[error("IO 错误：{0}")]
    IoError(#[from] std::io::Error),

    /// 补全写入失败（执行器内部捕获，记录为 failed）
    #[error("写入失败：{0}")]
    WriteError(String),

    /// 报告生成或写入失败
    #[error("报告生成失败：{0}")]
    ReportError(String),

    /// JSON 序列化/反序列化错误
    #[error("序列化失败：{0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 便捷类型别名，统一项目内的 Result 签名
pub type AppResult<T> = Result<T, AppError>;

/// 将 AppError 转换为 String，保持与 commands 层返回类型的兼容性
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::IoError(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_app_error_into_string_keeps_message() {
        let msg: String = AppError::ConfigError("并发数必须大于 0".to_string()).into();
        assert_eq!(msg, "配置无效：并发数必须大于 0");
    }
}
