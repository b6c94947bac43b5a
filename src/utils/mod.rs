pub mod path;
pub mod progress;

pub use path::{sanitize_dir_name, sanitize_file_name};
pub use progress::{BarProgress, NoProgress, ProgressReporter};
