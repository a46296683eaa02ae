//! Post-delivery satisfaction survey engine.
//!
//! Everything in here is a pure function of the survey dataset, the question
//! catalog, the [`SurveyRules`] constants and an [`AggregationFilter`]. Nothing is
//! cached between calls, so a caller can rebuild the report whenever its filter
//! selection changes.

pub mod domain;
pub mod export;
pub mod extractor;
pub mod filter;
pub mod report;
pub mod router;
pub mod scoring;

pub use domain::{
    Contact, FieldMap, FieldValue, Partition, QuestionCatalog, SatisfactionTier, SurveyDataset,
    SurveyResponse,
};
pub use extractor::{ExtractedFields, FieldMarker, MarkerExtractor, VehicleInfo};
pub use filter::{AggregationFilter, FilteredPartitions, Selection};
pub use report::SurveyReport;
pub use router::survey_router;
pub use scoring::{SurveyRules, TierBands};
