use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

use quiz_solve_submit::utils::logging;
use quiz_solve_submit::{App, Config, SolveRequest, StrategyKind};

/// 抓取题目页面、求解并提交答案
#[derive(Debug, Parser)]
#[command(name = "quiz-solver", version, about)]
struct Cli {
    /// 题目地址，可以给多个
    #[arg(required = true)]
    urls: Vec<String>,

    /// TOML 配置文件
    #[arg(short, long, env = "QUIZ_CONFIG")]
    config: Option<PathBuf>,

    /// 请求使用的邮箱，默认取配置中的 EMAIL
    #[arg(long)]
    email: Option<String>,

    /// 请求使用的密钥，默认取配置中的 SECRET_STRING
    #[arg(long)]
    secret: Option<String>,

    /// 求解策略，auto 表示按题目内容自动选择
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    strategy: StrategyArg,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Auto,
    Simple,
    Scraping,
    Tabular,
    Document,
}

impl StrategyArg {
    fn into_kind(self) -> Option<StrategyKind> {
        match self {
            StrategyArg::Auto => None,
            StrategyArg::Simple => Some(StrategyKind::Simple),
            StrategyArg::Scraping => Some(StrategyKind::WebScraping),
            StrategyArg::Tabular => Some(StrategyKind::Tabular),
            StrategyArg::Document => Some(StrategyKind::Document),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.verbose || config.verbose_logging);

    let email = cli.email.clone().unwrap_or_else(|| config.email.clone());
    let secret = cli.secret.clone().unwrap_or_else(|| config.secret.clone());
    let strategy = cli.strategy.into_kind();
    let requests: Vec<SolveRequest> = cli
        .urls
        .iter()
        .map(|url| SolveRequest {
            email: email.clone(),
            secret: secret.clone(),
            url: url.clone(),
            strategy,
        })
        .collect();

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    let outcomes = app.solve_all(requests).await;
    app.shutdown().await;

    let mut any_failed = false;
    for (url, outcome) in cli.urls.iter().zip(&outcomes) {
        let line = match outcome {
            Ok(report) => json!({ "url": url, "result": report }),
            Err(failure) => {
                any_failed = true;
                json!({ "url": url, "error": failure })
            }
        };
        println!("{}", serde_json::to_string_pretty(&line)?);
    }

    Ok(if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
