/// Longest directory name created for a topic or book
pub const MAX_DIR_NAME_CHARS: usize = 50;

fn is_invalid(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

fn clean(name: &str) -> String {
    name.chars()
        .map(|c| if is_invalid(c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .trim_end_matches('.')
        .to_string()
}

/// Directory name for a topic or title: invalid characters become `_`,
/// capped at 50 characters
pub fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = clean(name).chars().take(MAX_DIR_NAME_CHARS).collect();
    let cleaned = cleaned.trim_end().trim_end_matches('.').to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// File name taken from a download URL; only invalid characters are replaced
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = clean(name);
    if cleaned.is_empty() || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}
