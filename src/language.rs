//! Fence tags for file contents.

use std::path::Path;

/// Markdown fence tag for a file, or `""` when the extension is unmapped.
///
/// Only a file named exactly `Dockerfile` is recognised without an
/// extension.
pub fn fence_tag(path: &Path) -> &'static str {
    if path.file_name().is_some_and(|n| n == "Dockerfile") {
        return "dockerfile";
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => tag_for_extension(&ext.to_ascii_lowercase()),
        None => "",
    }
}

/// Static extension to language mapping.
pub fn tag_for_extension(ext: &str) -> &'static str {
    match ext {
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "json" => "json",
        "md" | "mdx" => "markdown",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "html" | "htm" => "html",
        "vue" => "vue",
        "svelte" => "svelte",
        "py" | "pyi" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "sh" | "bash" => "bash",
        "zsh" => "zsh",
        "sql" => "sql",
        "graphql" | "gql" => "graphql",
        "prisma" => "prisma",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_extensions() {
        assert_eq!(fence_tag(Path::new("src/index.ts")), "typescript");
        assert_eq!(fence_tag(Path::new("src/App.tsx")), "tsx");
        assert_eq!(fence_tag(Path::new("main.rs")), "rust");
        assert_eq!(fence_tag(Path::new("config.YML")), "yaml");
    }

    #[test]
    fn test_dockerfile_special_case() {
        assert_eq!(fence_tag(Path::new("Dockerfile")), "dockerfile");
        assert_eq!(fence_tag(Path::new("deploy/Dockerfile")), "dockerfile");
        assert_eq!(fence_tag(Path::new("dockerfile")), "");
        assert_eq!(fence_tag(Path::new("Makefile")), "");
    }

    #[test]
    fn test_unmapped_extension() {
        assert_eq!(fence_tag(Path::new("notes.txt")), "");
        assert_eq!(tag_for_extension("zig"), "");
    }
}
