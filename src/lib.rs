//! # Quiz Solve Submit
//!
//! 自动求解网页题目并提交答案的 Rust 应用程序
//!
//! ## 架构设计
//!
//! ### ① 外部协作者（Clients / Browser）
//! - `browser/` - 进程级浏览器引擎，每个请求领取独立的浏览器上下文
//! - `clients/` - LLM、HTTP 下载与提交、PDF 解析，全部以 trait 形式注入
//!
//! ### ② 业务能力层（Services / Strategies）
//! - `services/` - 内容提取、题目分类、策略路由、答案提交、结果日志
//! - `strategies/` - 简单问答、网页抓取、表格数据、文档分析四种求解策略
//!
//! ### ③ 流程层（Workflow）
//! - `QuizCtx` - 上下文封装（请求序号 + 题目地址）
//! - `QuizFlow` - 流程编排（抓取 → 分类 → 路由 → 求解 → 提交）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 请求校验、并发控制、资源生命周期
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod strategies;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{PipelineStage, QuizError, QuizResult};
pub use models::{SolveFailure, SolveReport, SolveRequest, StrategyKind};
pub use orchestrator::{App, SolveOutcome};
pub use workflow::{QuizCtx, QuizFlow};
