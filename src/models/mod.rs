//! Data models

pub mod detection;
pub mod finding;
pub mod outcome;

pub use detection::*;
pub use finding::*;
pub use outcome::*;
