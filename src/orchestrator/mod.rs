//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量请求的调度和资源管理，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理 Vec<SolveRequest>，持有浏览器引擎)
//!     ↓
//! workflow::QuizFlow (处理单个请求：抓取 → 分类 → 路由 → 求解 → 提交)
//!     ↓
//! strategies / services (能力层：求解策略、分类、提交、结果日志)
//!     ↓
//! clients / browser (外部协作者：LLM、HTTP、PDF、浏览器)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有浏览器引擎
//! 2. **依赖注入**：协作者在启动时构造一次，显式传入流程
//! 3. **无业务逻辑**：只做校验、调度和统计

pub mod app;

pub use app::{App, SolveOutcome};
