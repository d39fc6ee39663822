pub mod quiz;
pub mod request;

pub use quiz::{
    Answer, AnswerFormat, Classification, QuizPage, ScrapeDirective, StrategyKind, TaskType,
};
pub use request::{SolveFailure, SolveReport, SolveRequest, Submission, SubmissionResult};
