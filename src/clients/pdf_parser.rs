//! PDF 文本解析
//!
//! 基于 `pdf-extract`（纯 Rust 实现），解析在阻塞线程池中执行

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::clients::DocumentParser;
use crate::error::DocumentError;

/// PDF 文本解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextParser;

impl PdfTextParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PdfTextParser {
    async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        let path = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&path))
            .await
            .map_err(|e| DocumentError::ParseFailed {
                source: Box::new(e),
            })?
            .map_err(|e| DocumentError::ParseFailed {
                source: e.to_string().into(),
            })?;

        debug!("PDF 共 {} 页", pages.len());
        Ok(pages)
    }
}
