/// Shell-style glob matching with recursive `**`
pub mod glob;

/// Ignore file line parsing and normalization
pub mod rules;

/// Folding parsed rules into a resolved excluded set
pub mod resolver;

pub use glob::{GlobMatcher, GlobOptions};
pub use resolver::{IgnoreSet, resolve};
pub use rules::IgnoreRule;
