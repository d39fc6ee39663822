pub mod classifier;
pub mod extractor;
pub mod report_writer;
pub mod router;
pub mod submitter;

pub use classifier::TaskClassifier;
pub use report_writer::ReportWriter;
pub use router::route;
pub use submitter::SubmissionAssembler;
