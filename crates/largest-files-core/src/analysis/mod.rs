/// Analysis over walked entries.
pub mod top_files;

pub use top_files::{top_k, validate_limit, TopK, DEFAULT_TOP_K};
