use std::ffi::OsStr;
use std::path::{Component, Path};

/// Shortest fence the collector will emit.
pub const MIN_FENCE_LEN: usize = 3;

pub fn get_language_tag(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "rb" => "ruby",
        "go" => "go",
        "java" => "java",
        "c" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "h" => "c",
        "sh" | "bash" => "bash",
        "html" => "html",
        "css" => "css",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        _ => "",
    }
}

/// Number of backticks needed to fence `content` so that no line inside it
/// can close the block early.
pub fn fence_len_for(content: &str) -> usize {
    content
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == '`').count())
        .filter(|&run| run >= MIN_FENCE_LEN)
        .map(|run| run + 1)
        .max()
        .unwrap_or(MIN_FENCE_LEN)
}

/// Renders a relative path with forward slashes regardless of platform.
pub fn display_rel_path(rel_path: &Path) -> String {
    rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tag_is_case_insensitive() {
        assert_eq!(get_language_tag(Path::new("src/Main.PY")), "python");
        assert_eq!(get_language_tag(Path::new("build.sh")), "bash");
        assert_eq!(get_language_tag(Path::new("Makefile")), "");
    }

    #[test]
    fn test_fence_len_plain_content() {
        assert_eq!(fence_len_for("fn main() {}\n"), 3);
        assert_eq!(fence_len_for(""), 3);
        assert_eq!(fence_len_for("inline `code` and ``more``"), 3);
    }

    #[test]
    fn test_fence_len_grows_past_embedded_fences() {
        assert_eq!(fence_len_for("# Title\n\n```rust\nfn x() {}\n```\n"), 4);
        assert_eq!(fence_len_for("  ````\n```\n"), 5);
    }

    #[test]
    fn test_display_rel_path_uses_forward_slashes() {
        let path: std::path::PathBuf = ["src", "bin", "tool.rs"].iter().collect();
        assert_eq!(display_rel_path(&path), "src/bin/tool.rs");
        assert_eq!(display_rel_path(Path::new("./a.txt")), "a.txt");
    }
}
