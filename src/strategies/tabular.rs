//! 表格数据策略
//!
//! 纯数值计算，不调用模型：下载 CSV，取出纯数字行求和，
//! 题目中有 cutoff 时只累加严格大于阈值的数。
//! 数值按 `u128` 计算，超出范围时报错而不是给出错误答案。

use std::sync::Arc;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::clients::Downloader;
use crate::error::{QuizError, QuizResult, ResourceKind, TabularError};
use crate::models::{Answer, Classification, QuizPage};
use crate::services::extractor;
use crate::utils::logging::truncate_text;

pub struct TabularStrategy {
    downloader: Arc<dyn Downloader>,
    default_origin: String,
}

impl TabularStrategy {
    pub fn new(downloader: Arc<dyn Downloader>, default_origin: impl Into<String>) -> Self {
        Self {
            downloader,
            default_origin: default_origin.into(),
        }
    }

    pub async fn solve(&self, page: &QuizPage, _classification: &Classification) -> QuizResult<Answer> {
        let base_origin =
            extractor::origin_of(&page.url).unwrap_or_else(|| self.default_origin.clone());
        let csv_url = extractor::extract_csv_url(&page.raw_markup, &page.question_text, &base_origin)
            .ok_or(QuizError::MissingResource(ResourceKind::Csv))?;
        info!("CSV 地址: {}", csv_url);

        let bytes = self
            .downloader
            .download(&csv_url)
            .await
            .map_err(QuizError::Download)?;
        let content = String::from_utf8_lossy(&bytes);
        info!("CSV 内容: {}", truncate_text(&content, 200));

        let numbers = parse_numeric_lines(&content).map_err(QuizError::extraction)?;
        info!("解析出 {} 个数字", numbers.len());

        let cutoff = extractor::extract_cutoff(&page.question_text);
        let answer = sum_above(&numbers, cutoff).map_err(QuizError::extraction)?;
        match cutoff {
            Some(c) => info!("大于 {} 的数字之和: {}", c, answer),
            None => info!("所有数字之和: {}", answer),
        }
        Ok(number_answer(answer))
    }
}

/// 取出去除空白后完全由数字组成的行，其余行忽略
///
/// 纯数字行超出 `u128` 时报错，不会被静默丢弃。
pub fn parse_numeric_lines(content: &str) -> Result<Vec<u128>, TabularError> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()))
        .map(|line| {
            line.parse::<u128>()
                .map_err(|_| TabularError::NumberTooLarge {
                    value: truncate_text(line, 40),
                })
        })
        .collect()
}

/// 求和；给出阈值时只累加严格大于阈值的数
pub fn sum_above(numbers: &[u128], cutoff: Option<u128>) -> Result<u128, TabularError> {
    numbers
        .iter()
        .filter(|&&n| cutoff.map_or(true, |c| n > c))
        .try_fold(0u128, |acc, &n| acc.checked_add(n))
        .ok_or(TabularError::SumOverflow)
}

/// JSON 数字只能精确表示 `u64`，更大的和以十进制字符串提交
fn number_answer(sum: u128) -> Answer {
    match u64::try_from(sum) {
        Ok(n) => json!(n),
        Err(_) => JsonValue::String(sum.to_string()),
    }
}
