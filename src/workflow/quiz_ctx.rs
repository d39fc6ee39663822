//! 请求处理上下文
//!
//! 封装"我正在处理第几个请求、哪个题目地址"这一信息

use std::fmt::Display;

/// 请求处理上下文
#[derive(Debug, Clone)]
pub struct QuizCtx {
    /// 请求序号（从1开始，仅用于日志显示）
    pub request_index: usize,

    /// 题目地址
    pub url: String,
}

impl QuizCtx {
    pub fn new(request_index: usize, url: impl Into<String>) -> Self {
        Self {
            request_index,
            url: url.into(),
        }
    }
}

impl Display for QuizCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} {}]", self.request_index, self.url)
    }
}
