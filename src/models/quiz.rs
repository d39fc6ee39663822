use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 答案
///
/// 提交端点 `answer` 字段能接受的任意值（数字、字符串、布尔或对象）。
pub type Answer = serde_json::Value;

/// 一次抓取得到的题目页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPage {
    /// 页面地址
    pub url: String,
    /// 页面纯文本
    pub question_text: String,
    /// 完整 HTML
    pub raw_markup: String,
    /// 从文本中提取出的提交地址
    pub submit_url: Option<String>,
}

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "simple", alias = "text_question")]
    Simple,
    #[serde(
        rename = "data_analysis",
        alias = "dataAnalysis",
        alias = "tabular"
    )]
    DataAnalysis,
    #[serde(rename = "document", alias = "pdf_extraction")]
    Document,
    #[serde(rename = "web_scraping", alias = "webScraping")]
    WebScraping,
    #[serde(rename = "visualization")]
    Visualization,
    #[serde(rename = "calculation")]
    Calculation,
}

/// 期望的答案格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    Number,
    String,
    Boolean,
    Object,
    #[serde(alias = "encodedFile", alias = "encoded_file")]
    Base64File,
}

impl fmt::Display for AnswerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnswerFormat::Number => "number",
            AnswerFormat::String => "string",
            AnswerFormat::Boolean => "boolean",
            AnswerFormat::Object => "object",
            AnswerFormat::Base64File => "base64_file",
        };
        f.write_str(name)
    }
}

/// LLM 给出的题目分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub task_type: TaskType,
    /// 题目中提到的文件链接
    #[serde(
        default,
        rename = "files_to_download",
        alias = "referenced_files",
        deserialize_with = "null_as_default"
    )]
    pub referenced_files: Vec<String>,
    #[serde(default)]
    pub submit_url: Option<String>,
    pub instructions: String,
    pub answer_format: AnswerFormat,
}

impl Classification {
    /// 分类结果中的提交地址（空字符串视为没有）
    pub fn submit_url(&self) -> Option<&str> {
        self.submit_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 网页抓取指令，只在抓取策略内部使用
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScrapeDirective {
    #[serde(rename = "scrape_url", alias = "target_url")]
    pub target_url: String,
    #[serde(rename = "what_to_find", alias = "extraction_goal")]
    pub extraction_goal: String,
}

/// 求解策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 简单问答
    Simple,
    /// 跟随链接抓取网页
    WebScraping,
    /// 表格数据计算
    Tabular,
    /// PDF 文档分析
    Document,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Simple => "simple",
            StrategyKind::WebScraping => "web_scraping",
            StrategyKind::Tabular => "tabular",
            StrategyKind::Document => "document",
        };
        f.write_str(name)
    }
}

// null 与缺失同样处理为默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
