//! 内容提取 - 业务能力层
//!
//! 从自由文本 / HTML 中用正则提取提交地址、文件链接、阈值等信息。
//! 全部是纯函数：找不到只返回 `None`，从不报错。

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static SUBMIT_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i:https?)://[^\s<>"']+/submit[^\s<>"']*"#).unwrap());

static CSV_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']*\.csv[^"']*)["']"#).unwrap());

static CSV_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s\]<>"']+\.csv"#).unwrap());

static PDF_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s\]<>"']+\.pdf"#).unwrap());

static CUTOFF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)cutoff[:\s]*(\d+)").unwrap());

static ORIGIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^/\s]+").unwrap());

/// 提取提交地址
///
/// 取第一个路径中带 `/submit` 的链接，并去掉末尾的 `.,;:`。
pub fn extract_submit_url(text: &str) -> Option<String> {
    SUBMIT_URL_RE.find(text).map(|m| {
        m.as_str()
            .trim_end_matches(&['.', ',', ';', ':'][..])
            .to_string()
    })
}

/// 提取 CSV 链接
///
/// 先找 HTML 中的 `href="...csv"`（相对地址基于 `base_origin` 补全），
/// 找不到再从纯文本中找裸链接。
pub fn extract_csv_url(markup: &str, text: &str, base_origin: &str) -> Option<String> {
    if let Some(caps) = CSV_HREF_RE.captures(markup) {
        let href = caps[1].trim();
        if is_absolute_http(href) {
            return Some(href.to_string());
        }
        return Some(join_origin(base_origin, href));
    }

    CSV_URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// 提取第一个 PDF 链接
pub fn extract_pdf_url(text: &str) -> Option<String> {
    PDF_URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// 提取 cutoff 阈值
///
/// 超出 `u128` 的阈值取 `u128::MAX`，即大于任何可表示的数。
pub fn extract_cutoff(text: &str) -> Option<u128> {
    CUTOFF_RE
        .captures(text)
        .map(|caps| caps[1].parse::<u128>().unwrap_or(u128::MAX))
}

/// 提取文本中出现的第一个 `scheme://host`
pub fn extract_origin(text: &str) -> Option<String> {
    ORIGIN_RE.find(text).map(|m| m.as_str().to_string())
}

/// 取 URL 的 origin（scheme + host + port）
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed.origin().ascii_serialization()),
        _ => None,
    }
}

/// 把以 `/` 开头（或不带 scheme）的路径拼到 origin 上
pub fn join_origin(origin: &str, path: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_url_strips_trailing_punctuation() {
        let text = "Post your answer to https://host.example/submit.";
        assert_eq!(
            extract_submit_url(text).as_deref(),
            Some("https://host.example/submit")
        );

        let text = "Submit to: HTTPS://host.example/submit/abc;, then wait";
        assert_eq!(
            extract_submit_url(text).as_deref(),
            Some("HTTPS://host.example/submit/abc")
        );
    }

    #[test]
    fn test_submit_url_stops_at_quote() {
        let text = r#"<a href="https://host.example/submit?id=3">go</a>"#;
        assert_eq!(
            extract_submit_url(text).as_deref(),
            Some("https://host.example/submit?id=3")
        );
    }

    #[test]
    fn test_submit_url_absent() {
        assert_eq!(extract_submit_url("no links here"), None);
        assert_eq!(extract_submit_url("see https://host.example/answer"), None);
    }

    #[test]
    fn test_csv_href_takes_precedence() {
        let markup = r#"<a href="/files/data.CSV">data</a>"#;
        let text = "Also at https://other.example/backup.csv";
        assert_eq!(
            extract_csv_url(markup, text, "https://host.example").as_deref(),
            Some("https://host.example/files/data.CSV")
        );
    }

    #[test]
    fn test_csv_href_absolute_kept() {
        let markup = r#"<a href='https://cdn.example/x.csv?v=2'>x</a>"#;
        assert_eq!(
            extract_csv_url(markup, "", "https://host.example").as_deref(),
            Some("https://cdn.example/x.csv?v=2")
        );
    }

    #[test]
    fn test_csv_falls_back_to_text() {
        let text = "Download https://host.example/numbers.csv and sum.";
        assert_eq!(
            extract_csv_url("<p>nothing</p>", text, "https://host.example").as_deref(),
            Some("https://host.example/numbers.csv")
        );
        assert_eq!(extract_csv_url("", "no files", "https://host.example"), None);
    }

    #[test]
    fn test_pdf_url_case_insensitive() {
        let text = "Read HTTPS://host.example/report.PDF then answer";
        assert_eq!(
            extract_pdf_url(text).as_deref(),
            Some("HTTPS://host.example/report.PDF")
        );
        assert_eq!(extract_pdf_url("no document"), None);
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(extract_cutoff("...cutoff: 42..."), Some(42));
        assert_eq!(extract_cutoff("Cutoff 7"), Some(7));
        assert_eq!(extract_cutoff("CUTOFF:\n13"), Some(13));
        assert_eq!(extract_cutoff("no threshold"), None);
        assert_eq!(extract_cutoff("cutoff: none"), None);
        assert_eq!(
            extract_cutoff("... cutoff: 99999999999999999999 ..."),
            Some(99_999_999_999_999_999_999)
        );
        assert_eq!(
            extract_cutoff(&format!("cutoff: {}0", u128::MAX)),
            Some(u128::MAX)
        );
    }

    #[test]
    fn test_origin_helpers() {
        assert_eq!(
            extract_origin("Visit https://host.example:8080/q1 now").as_deref(),
            Some("https://host.example:8080")
        );
        assert_eq!(extract_origin("relative /q1 only"), None);
        assert_eq!(
            origin_of("https://host.example/q1?x=1").as_deref(),
            Some("https://host.example")
        );
        assert_eq!(origin_of("not a url"), None);
        assert_eq!(
            join_origin("https://host.example/", "/submit/abc"),
            "https://host.example/submit/abc"
        );
    }
}
