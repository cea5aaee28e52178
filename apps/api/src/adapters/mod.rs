// Production collaborators behind the analysis traits.
// S3 for objects, pdftoppm for rendering, Redis for records, Claude for feedback.

pub mod converter;
pub mod inference;
pub mod kv;
pub mod storage;
