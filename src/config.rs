use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 优先级：环境变量 > TOML 配置文件 > 默认值
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 提交答案时使用的邮箱
    pub email: String,
    /// 共享密钥
    pub secret: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 相对地址找不到来源时的兜底 origin
    pub default_origin: String,
    // --- 浏览器配置 ---
    /// 设置后连接已有浏览器的调试端口，否则启动无头浏览器
    pub browser_debug_port: Option<u16>,
    pub chrome_executable: Option<String>,
    pub navigation_timeout_ms: u64,
    pub element_timeout_ms: u64,
    /// 页面加载后等待脚本执行的时间
    pub settle_delay_ms: u64,
    // --- HTTP 配置 ---
    pub http_timeout_secs: u64,
    /// 同时处理的请求数量
    pub max_concurrent_requests: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 结果日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: String::new(),
            secret: String::new(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            default_origin: "https://tds-llm-analysis.s-anand.net".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            navigation_timeout_ms: 30_000,
            element_timeout_ms: 5_000,
            settle_delay_ms: 2_000,
            http_timeout_secs: 60,
            max_concurrent_requests: 4,
            verbose_logging: false,
            output_log_file: "quiz_results.log".to_string(),
        }
    }
}

impl Config {
    /// 仅从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 解析 TOML 配置文件
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: display.clone(),
            source: Box::new(e),
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::TomlParseFailed {
            path: display,
            source: Box::new(e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 检查必需配置是否齐全
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("EMAIL", &self.email),
            ("SECRET_STRING", &self.secret),
            ("LLM_API_KEY", &self.llm_api_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            email: env_string("EMAIL").unwrap_or(base.email),
            secret: env_string("SECRET_STRING").unwrap_or(base.secret),
            llm_api_key: env_string("LLM_API_KEY")
                .or_else(|| env_string("OPENAI_API_KEY"))
                .unwrap_or(base.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(base.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(base.llm_model_name),
            default_origin: env_string("DEFAULT_ORIGIN").unwrap_or(base.default_origin),
            browser_debug_port: env_parsed("BROWSER_DEBUG_PORT").or(base.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(base.chrome_executable),
            navigation_timeout_ms: env_parsed("NAVIGATION_TIMEOUT_MS")
                .unwrap_or(base.navigation_timeout_ms),
            element_timeout_ms: env_parsed("ELEMENT_TIMEOUT_MS").unwrap_or(base.element_timeout_ms),
            settle_delay_ms: env_parsed("SETTLE_DELAY_MS").unwrap_or(base.settle_delay_ms),
            http_timeout_secs: env_parsed("HTTP_TIMEOUT_SECS").unwrap_or(base.http_timeout_secs),
            max_concurrent_requests: env_parsed("MAX_CONCURRENT_REQUESTS")
                .unwrap_or(base.max_concurrent_requests),
            verbose_logging: env_parsed("VERBOSE_LOGGING").unwrap_or(base.verbose_logging),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}
