/// Breadth-first source tree scanning against a resolved ignore set.
pub mod tree;

pub use tree::{ScanResult, TreeScanner};
