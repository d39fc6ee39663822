//! 结果日志服务 - 业务能力层
//!
//! 只负责"把每次求解结果追加写入日志文件"，写入失败不影响请求本身

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{debug, warn};

use crate::models::{SolveFailure, SolveReport};

/// 结果日志服务
#[derive(Debug, Clone)]
pub struct ReportWriter {
    log_file_path: String,
}

impl ReportWriter {
    pub fn new(log_file_path: impl Into<String>) -> Self {
        Self {
            log_file_path: log_file_path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    /// 写入日志文件头（覆盖旧文件）
    pub fn init(&self) -> std::io::Result<()> {
        let header = format!(
            "{}\n题目求解日志 - {}\n{}\n\n",
            "=".repeat(60),
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.log_file_path, header)
    }

    /// 记录一次求解结果
    pub fn record(&self, quiz_url: &str, outcome: &Result<SolveReport, SolveFailure>) {
        let line = format_line(quiz_url, outcome);
        debug!("写入结果日志: {}", line.trim_end());
        if let Err(e) = self.append(&line) {
            warn!("写入结果日志失败 ({}): {}", self.log_file_path, e);
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)?;
        file.write_all(line.as_bytes())
    }
}

fn format_line(quiz_url: &str, outcome: &Result<SolveReport, SolveFailure>) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    match outcome {
        Ok(report) => format!(
            "[{}] ✅ {} | 策略: {} | 答案: {} | 正确: {} | 下一题: {}\n",
            timestamp,
            quiz_url,
            report.strategy,
            report.answer_submitted,
            report
                .correct
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            report.next_url.as_deref().unwrap_or("-")
        ),
        Err(failure) => format!(
            "[{}] ❌ {} | 阶段: {} | 原因: {}\n",
            timestamp, quiz_url, failure.stage, failure.reason
        ),
    }
}
