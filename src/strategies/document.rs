//! 文档分析策略
//!
//! 下载 PDF 写入临时文件，逐页提取文本后交给模型给出答案。
//! 临时文件由 [`NamedTempFile`] 持有，任何返回路径上都会被删除。

use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::info;

use crate::clients::llm_client::required_field;
use crate::clients::{DocumentParser, Downloader, LanguageModel};
use crate::error::{DocumentError, QuizError, QuizResult, ResourceKind};
use crate::models::{Answer, Classification, QuizPage};
use crate::services::extractor;
use crate::utils::logging::truncate_text;

const SYSTEM_MESSAGE: &str = "Extract precise answers from PDF content.";

pub struct DocumentStrategy {
    downloader: Arc<dyn Downloader>,
    parser: Arc<dyn DocumentParser>,
    llm: Arc<dyn LanguageModel>,
}

impl DocumentStrategy {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        parser: Arc<dyn DocumentParser>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            downloader,
            parser,
            llm,
        }
    }

    pub async fn solve(&self, page: &QuizPage, _classification: &Classification) -> QuizResult<Answer> {
        let pdf_url = extractor::extract_pdf_url(&page.question_text)
            .ok_or(QuizError::MissingResource(ResourceKind::Pdf))?;
        info!("PDF 地址: {}", pdf_url);

        let bytes = self
            .downloader
            .download(&pdf_url)
            .await
            .map_err(QuizError::Download)?;
        info!("PDF 下载完成: {} 字节", bytes.len());

        let temp = write_temp_pdf(&bytes).map_err(QuizError::extraction)?;
        let pages = self
            .parser
            .extract_pages(temp.path())
            .await
            .map_err(QuizError::extraction)?;
        info!("PDF 共 {} 页", pages.len());

        let full_text = join_pages(&pages);
        info!("提取文本: {}", truncate_text(&full_text, 300));

        let prompt = format!(
            r#"Extract the answer from this PDF.

Question: {}

PDF Content:
{}

Respond: {{"answer": <value>}}

JSON only."#,
            page.question_text, full_text
        );

        let value = self
            .llm
            .complete_json(SYSTEM_MESSAGE, &prompt)
            .await
            .map_err(QuizError::extraction)?;
        let answer = required_field(&value, "answer")
            .map_err(QuizError::extraction)?
            .clone();
        info!("PDF 答案: {}", answer);
        Ok(answer)
    }
}

fn write_temp_pdf(bytes: &[u8]) -> Result<NamedTempFile, DocumentError> {
    let to_error = |e: std::io::Error| DocumentError::TempFileFailed {
        source: Box::new(e),
    };
    let mut file = tempfile::Builder::new()
        .prefix("quiz-")
        .suffix(".pdf")
        .tempfile()
        .map_err(to_error)?;
    file.write_all(bytes).map_err(to_error)?;
    file.flush().map_err(to_error)?;
    Ok(file)
}

/// 拼接各页文本，每页前插入 `--- Page N ---` 分隔标记
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("\n--- Page {} ---\n{}", i + 1, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_support::{ScriptedLlm, StaticDownloader};
    use crate::error::LlmError;
    use crate::models::{AnswerFormat, TaskType};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tokio_test::assert_err;

    const PDF_URL: &str = "https://host.example/files/report.pdf";

    /// 记录收到的路径，并确认解析时文件存在且内容完整
    struct RecordingParser {
        pages: Option<Vec<String>>,
        seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
    }

    impl RecordingParser {
        fn new(pages: Option<Vec<&str>>) -> Self {
            Self {
                pages: pages.map(|p| p.into_iter().map(String::from).collect()),
                seen: Mutex::new(None),
            }
        }

        fn seen_path(&self) -> PathBuf {
            self.seen.lock().unwrap().clone().unwrap().0
        }
    }

    #[async_trait]
    impl DocumentParser for RecordingParser {
        async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
            let content = std::fs::read(path).unwrap();
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), content));
            self.pages.clone().ok_or_else(|| DocumentError::ParseFailed {
                source: "not a pdf".into(),
            })
        }
    }

    fn classification() -> Classification {
        Classification {
            task_type: TaskType::Document,
            referenced_files: vec![PDF_URL.to_string()],
            submit_url: None,
            instructions: "Read the PDF".to_string(),
            answer_format: AnswerFormat::Number,
        }
    }

    fn page(text: &str) -> QuizPage {
        QuizPage {
            url: "https://host.example/q3".to_string(),
            question_text: text.to_string(),
            raw_markup: String::new(),
            submit_url: None,
        }
    }

    fn downloader() -> Arc<StaticDownloader> {
        Arc::new(StaticDownloader::with_file(PDF_URL, b"%PDF-1.4 fake"))
    }

    #[test]
    fn test_join_pages_inserts_markers() {
        let pages = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(join_pages(&pages), "\n--- Page 1 ---\nalpha\n--- Page 2 ---\nbeta");
        assert_eq!(join_pages(&[]), "");
    }

    #[tokio::test]
    async fn test_answer_extracted_and_temp_file_removed() {
        let parser = Arc::new(RecordingParser::new(Some(vec!["total 10", "total 32"])));
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(json!({"answer": 42}))]));
        let strategy = DocumentStrategy::new(downloader(), parser.clone(), llm.clone());

        let answer = strategy
            .solve(&page(&format!("Add the totals in {}.", PDF_URL)), &classification())
            .await
            .unwrap();
        assert_eq!(answer, json!(42));

        let (path, content) = parser.seen.lock().unwrap().clone().unwrap();
        assert_eq!(content, b"%PDF-1.4 fake".to_vec());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert!(!path.exists());

        let prompt = llm.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("--- Page 1 ---\ntotal 10"));
        assert!(prompt.contains("--- Page 2 ---\ntotal 32"));
    }

    #[tokio::test]
    async fn test_parse_failure_still_removes_temp_file() {
        let parser = Arc::new(RecordingParser::new(None));
        let strategy = DocumentStrategy::new(
            downloader(),
            parser.clone(),
            Arc::new(ScriptedLlm::default()),
        );

        let err = assert_err!(strategy.solve(&page(PDF_URL), &classification()).await);
        assert!(matches!(err, QuizError::Extraction { .. }));
        assert!(!parser.seen_path().exists());
    }

    #[tokio::test]
    async fn test_malformed_model_output_is_extraction_error() {
        let parser = Arc::new(RecordingParser::new(Some(vec!["text"])));
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(json!({"value": 1}))]));
        let strategy = DocumentStrategy::new(downloader(), parser.clone(), llm);

        let err = assert_err!(strategy.solve(&page(PDF_URL), &classification()).await);
        assert!(matches!(err, QuizError::Extraction { .. }));
        assert!(!parser.seen_path().exists());
    }

    #[tokio::test]
    async fn test_model_failure_is_extraction_error() {
        let parser = Arc::new(RecordingParser::new(Some(vec!["text"])));
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::EmptyContent {
            model: "stub".to_string(),
        })]));
        let strategy = DocumentStrategy::new(downloader(), parser, llm);

        let err = assert_err!(strategy.solve(&page(PDF_URL), &classification()).await);
        assert_eq!(err.stage(), crate::error::PipelineStage::Solve);
    }

    #[tokio::test]
    async fn test_missing_pdf_url() {
        let strategy = DocumentStrategy::new(
            Arc::new(StaticDownloader::default()),
            Arc::new(RecordingParser::new(None)),
            Arc::new(ScriptedLlm::default()),
        );
        let err = assert_err!(
            strategy
                .solve(&page("No attachment here"), &classification())
                .await
        );
        assert!(matches!(err, QuizError::MissingResource(ResourceKind::Pdf)));
    }
}
