//! Candidate selection: which files are worth fetching

use super::node::{TreeNode, walk_forest};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Extensions scanned when no allowlist is configured
pub const DEFAULT_EXTENSION_ALLOWLIST: &[&str] = &[
    // Source
    "py", "pyw", "js", "jsx", "mjs", "cjs", "ts", "tsx", "vue", "svelte", "go", "rs", "rb",
    "java", "kt", "kts", "scala", "swift", "c", "h", "cc", "cpp", "hpp", "cs", "php", "pl",
    "lua", "r", "dart", "ex", "exs", "sql",
    // Shell and build
    "sh", "bash", "zsh", "ps1", "bat", "dockerfile", "makefile", "gradle", "tf", "hcl",
    // Config
    "json", "yaml", "yml", "toml", "xml", "ini", "cfg", "conf", "properties", "env",
    "gitignore",
    // Markup and docs
    "html", "htm", "css", "scss", "md", "mdx", "rst", "txt", "csv",
];

/// Extensions never worth fetching, checked before the allowlist
pub static BINARY_EXTENSIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Executables
        "exe", "dll", "so", "dylib", "bin", "o", "a", "class", "jar", "wasm", "pyc",
        // Images
        "jpg", "jpeg", "png", "gif", "bmp", "ico", "svg", "webp", "tiff", "psd",
        // Archives
        "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar",
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
        // Media
        "mp3", "mp4", "avi", "mov", "wav", "flac", "ogg", "webm",
        // Fonts
        "ttf", "otf", "woff", "woff2", "eot",
        // Data blobs
        "sqlite", "db", "pkl", "npy", "parquet",
    ]
    .into_iter()
    .collect()
});

/// A file selected for scanning, before its content is fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    pub path: String,
    pub size: Option<u64>,
}

/// Extension key used for candidate selection
///
/// The lowercase text after the last `.`, or the whole lowercase name when
/// there is none, so `Dockerfile` keys as `dockerfile`. Every `.env` variant
/// keys as `env`.
pub fn extension_key(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with(".env") {
        return "env".to_string();
    }
    match lower.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => lower,
    }
}

/// Extension allowlist with the binary denylist applied first
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    allowlist: HashSet<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION_ALLOWLIST.iter().copied())
    }
}

impl CandidateFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowlist = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { allowlist }
    }

    pub fn is_candidate(&self, name: &str) -> bool {
        let key = extension_key(name);
        !BINARY_EXTENSIONS.contains(key.as_str()) && self.allowlist.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.allowlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowlist.is_empty()
    }
}

/// Collect candidate files depth-first in display order
pub fn collect_candidates(nodes: &[TreeNode], filter: &CandidateFilter) -> Vec<CandidateFile> {
    walk_forest(nodes)
        .filter(|node| node.is_file() && filter.is_candidate(&node.name))
        .map(|node| CandidateFile {
            path: node.path.clone(),
            size: node.size,
        })
        .collect()
}
