pub mod matcher;

pub use matcher::{CategoryScores, Categorizer};
