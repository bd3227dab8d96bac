// ============================================================================
// 命令层：薄封装，把服务层的 AppError 转换为 String 返回给入口
// ============================================================================

pub mod pipeline;
