// ============================================================================
// 运行上下文：一次流水线运行的全部表，按引用在各阶段之间传递
// 不使用任何全局状态，并发的测试运行彼此隔离
// ============================================================================

use std::collections::BTreeMap;

use crate::models::dtos::{CompletionPlan, ExecutionSummary, FileRecord, Intention, RelationshipEdge, RunStats};
use crate::models::patterns::PatternLibrary;

#[derive(Debug, Default)]
pub struct RunContext {
    /// 内容文件（字节数 > 0）
    pub content: BTreeMap<String, FileRecord>,
    /// 骨架文件（字节数 == 0）
    pub skeleton: BTreeMap<String, FileRecord>,
    pub patterns: PatternLibrary,
    /// 以骨架文件路径为键
    pub intentions: BTreeMap<String, Intention>,
    /// 以内容文件路径为键
    pub relationships: BTreeMap<String, RelationshipEdge>,
    pub plan: CompletionPlan,
    /// 仅 complete 运行有值
    pub execution: Option<ExecutionSummary>,
    pub stats: RunStats,
}

impl RunContext {
    pub fn total_files(&self) -> usize {
        self.content.len() + self.skeleton.len()
    }
}
