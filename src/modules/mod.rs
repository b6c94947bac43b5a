pub mod catalog;
pub mod integrations;
pub mod matching;
