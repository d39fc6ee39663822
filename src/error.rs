//! 错误类型定义
//!
//! 每个外部协作者一个错误枚举，流水线层统一收敛为 [`QuizError`]。

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 第三方库错误的统一装箱类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed { source: BoxError },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed { port: u16, source: BoxError },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {source}")]
    ConfigurationFailed { source: BoxError },
    /// 创建隔离上下文失败
    #[error("创建浏览器上下文失败: {source}")]
    ContextCreationFailed { source: BoxError },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed { source: BoxError },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed { url: String, source: BoxError },
    /// 导航超时
    #[error("导航到 {url} 超时 ({timeout_ms} ms)")]
    NavigationTimeout { url: String, timeout_ms: u64 },
    /// 读取页面内容失败
    #[error("读取页面内容失败 ({url}): {source}")]
    ContentReadFailed { url: String, source: BoxError },
}

/// HTTP 调用错误（下载与提交）
#[derive(Debug, Error)]
pub enum HttpError {
    /// 网络请求失败
    #[error("HTTP请求失败 ({endpoint}): {source}")]
    RequestFailed { endpoint: String, source: BoxError },
    /// 返回非成功状态码
    #[error("HTTP返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// JSON 解析失败
    #[error("响应JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed { endpoint: String, source: BoxError },
}

/// LLM 服务错误
///
/// 传输失败与结构化输出不合法属于同一类失败，调用方不做区分。
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("LLM请求构建失败: {source}")]
    RequestBuildFailed { source: BoxError },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed { model: String, source: BoxError },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容不是合法 JSON
    #[error("LLM返回内容不是合法JSON (响应: {response}): {source}")]
    InvalidJson { response: String, source: BoxError },
    /// JSON 结构不符合预期
    #[error("LLM返回结构不符合预期: {source}")]
    InvalidShape { source: BoxError },
    /// 缺少必需字段
    #[error("LLM返回缺少字段: {field}")]
    MissingField { field: String },
}

/// 文档解析错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 临时文件操作失败
    #[error("临时文件操作失败: {source}")]
    TempFileFailed { source: BoxError },
    /// 解析失败
    #[error("文档解析失败: {source}")]
    ParseFailed { source: BoxError },
}

/// 表格数值计算错误
#[derive(Debug, Error)]
pub enum TabularError {
    /// 纯数字行超出可计算范围
    #[error("数值超出可计算范围: {value}")]
    NumberTooLarge { value: String },
    /// 求和结果溢出
    #[error("求和结果溢出")]
    SumOverflow,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxError },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed { path: String, source: BoxError },
    /// 必需配置缺失
    #[error("缺少必需配置: {name}")]
    MissingValue { name: String },
}

/// 缺失的资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Csv,
    Pdf,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Csv => write!(f, "CSV文件链接"),
            ResourceKind::Pdf => write!(f, "PDF文件链接"),
        }
    }
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// 请求校验
    Request,
    /// 身份校验
    Auth,
    /// 抓取页面
    Fetch,
    /// 分类
    Classify,
    /// 求解
    Solve,
    /// 提交
    Submit,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Request => "request",
            PipelineStage::Auth => "auth",
            PipelineStage::Fetch => "fetch",
            PipelineStage::Classify => "classify",
            PipelineStage::Solve => "solve",
            PipelineStage::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// 流水线错误
///
/// 任何一个阶段失败都会终止本次请求，不重试。
#[derive(Debug, Error)]
pub enum QuizError {
    /// 页面抓取失败
    #[error("页面抓取失败: {0}")]
    Fetch(#[source] BrowserError),
    /// 题目分类失败
    #[error("题目分类失败: {0}")]
    Classification(#[source] LlmError),
    /// 未找到所需资源
    #[error("未找到{0}")]
    MissingResource(ResourceKind),
    /// 下载失败
    #[error("下载失败: {0}")]
    Download(#[source] HttpError),
    /// 网页抓取策略失败
    #[error("网页抓取求解失败: {0}")]
    Scrape(#[source] LlmError),
    /// 从下载的资源中计算或提取答案失败
    #[error("答案提取失败: {source}")]
    Extraction { source: BoxError },
    /// 没有可用的提交地址
    #[error("页面和分类结果中都没有提交地址")]
    MissingSubmitUrl,
    /// 提交失败
    #[error("提交答案失败: {0}")]
    Submission(#[source] HttpError),
}

impl QuizError {
    /// 错误所属的流水线阶段
    pub fn stage(&self) -> PipelineStage {
        match self {
            QuizError::Fetch(_) => PipelineStage::Fetch,
            QuizError::Classification(_) => PipelineStage::Classify,
            QuizError::MissingResource(_)
            | QuizError::Download(_)
            | QuizError::Scrape(_)
            | QuizError::Extraction { .. } => PipelineStage::Solve,
            QuizError::MissingSubmitUrl | QuizError::Submission(_) => PipelineStage::Submit,
        }
    }

    /// 创建答案提取错误
    pub fn extraction(source: impl Into<BoxError>) -> Self {
        QuizError::Extraction {
            source: source.into(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl BrowserError {
    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// 创建内容读取错误
    pub fn content_read_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BrowserError::ContentReadFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

impl HttpError {
    /// 创建请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        HttpError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }
}

impl LlmError {
    /// 创建 LLM API 调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建缺少字段错误
    pub fn missing_field(field: impl Into<String>) -> Self {
        LlmError::MissingField {
            field: field.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 流水线结果类型
pub type QuizResult<T> = Result<T, QuizError>;
