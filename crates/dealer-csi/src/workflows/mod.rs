pub mod feed;
pub mod survey;
