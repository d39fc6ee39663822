//! 策略路由
//!
//! 规则按顺序匹配，文本规则会覆盖模型给出的标签：
//! 1. 分类为 web_scraping → 网页抓取
//! 2. 文本（小写）包含 "csv" 或 "cutoff" → 表格数据
//! 3. 其余 → 简单问答
//!
//! 文档分析不会被自动选中，只能由调用方显式指定。

use crate::models::{Classification, QuizPage, StrategyKind, TaskType};

/// 为题目选择求解策略
pub fn route(page: &QuizPage, classification: &Classification) -> StrategyKind {
    if classification.task_type == TaskType::WebScraping {
        return StrategyKind::WebScraping;
    }

    let text = page.question_text.to_lowercase();
    if text.contains("csv") || text.contains("cutoff") {
        return StrategyKind::Tabular;
    }

    StrategyKind::Simple
}
