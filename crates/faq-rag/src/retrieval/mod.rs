//! Query answering: policy pre-filter, retrieval, grounded generation, post-filter

pub mod pipeline;

pub use pipeline::QueryPipeline;
