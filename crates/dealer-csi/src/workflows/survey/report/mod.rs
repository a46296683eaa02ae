mod aggregate;
mod distribution;
mod insights;
mod summary;
pub mod views;

pub use aggregate::{overall_index, question_averages};
pub use distribution::satisfaction_distribution;
pub use summary::SurveyReport;

pub(crate) use insights::generate_insights;
