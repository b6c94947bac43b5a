//! External collaborators: topic expansion through a language model and
//! prompt language detection

pub mod language;
pub mod topic_expansion;

pub use language::{Language, detect_language};
pub use topic_expansion::{
    OpenAiExpander, TopicExpander, build_prompt, expand_topic, parse_book_list,
};
