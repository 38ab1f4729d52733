use std::path::{Path, PathBuf};

use crate::markdown::markdown_to_html;
use crate::post::Post;

/// Substituted for a post body that cannot be read.
pub const FALLBACK_CONTENT: &str = "could not load post";

/// Resolves a post's `html_content` reference to its body text.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ContentLoader {
    /// Relative content paths are resolved against `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Read the body at `path`. Any failure yields [`FALLBACK_CONTENT`].
    pub fn load_content(&self, path: &str) -> String {
        self.read(path).unwrap_or_else(|| FALLBACK_CONTENT.to_string())
    }

    /// Copy of `post` with its body filled in. Markdown bodies are converted
    /// to HTML, anything else is embedded as-is.
    pub fn load_post(&self, post: &Post) -> Post {
        let mut loaded = post.clone();
        loaded.content = match self.read(&post.html_content) {
            Some(body) if is_markdown(&post.html_content) => markdown_to_html(&body),
            Some(body) => body,
            None => FALLBACK_CONTENT.to_string(),
        };

        loaded
    }

    /// Invalid UTF-8 is replaced with U+FFFD. Only I/O errors yield `None`.
    fn read(&self, path: &str) -> Option<String> {
        let full_path = self.root.join(path);
        match std::fs::read(&full_path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                tracing::warn!(path = %full_path.display(), error = %err, "could not load post content");
                None
            }
        }
    }
}

fn is_markdown(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_returns_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());
        assert_eq!(loader.load_content("nope/content.html"), FALLBACK_CONTENT);
    }

    #[test]
    fn test_placeholder_text_returns_fallback() {
        let loader = ContentLoader::default();
        assert_eq!(loader.load_content("test content"), FALLBACK_CONTENT);
        assert_eq!(loader.load_content(""), FALLBACK_CONTENT);
    }

    #[test]
    fn test_directory_returns_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let loader = ContentLoader::new(dir.path());
        assert_eq!(loader.load_content("sub"), FALLBACK_CONTENT);
    }

    #[test]
    fn test_existing_file_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let body = "<p>Hello</p>\n<p>ünïcode &amp; all</p>\n";
        std::fs::write(dir.path().join("post.html"), body).unwrap();

        let loader = ContentLoader::new(dir.path());
        assert_eq!(loader.load_content("post.html"), body);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latin1.html"), b"<p>caf\xe9 au lait</p>").unwrap();

        let loader = ContentLoader::new(dir.path());
        let body = loader.load_content("latin1.html");
        assert_ne!(body, FALLBACK_CONTENT);
        assert_eq!(body, "<p>caf\u{FFFD} au lait</p>");
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abs.html");
        std::fs::write(&file, "absolute").unwrap();

        let loader = ContentLoader::new("/definitely/not/here");
        assert_eq!(loader.load_content(file.to_str().unwrap()), "absolute");
    }

    #[test]
    fn test_load_post_fills_copy_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "<p>X</p>").unwrap();
        let post = Post {
            id: "a".into(),
            html_content: "a.html".into(),
            ..Default::default()
        };

        let loaded = ContentLoader::new(dir.path()).load_post(&post);
        assert_eq!(loaded.content, "<p>X</p>");
        assert!(post.content.is_empty());
    }

    #[test]
    fn test_load_post_converts_markdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Title\n\nSome *text*.\n").unwrap();
        let post = Post {
            id: "a".into(),
            html_content: "a.md".into(),
            ..Default::default()
        };

        let loaded = ContentLoader::new(dir.path()).load_post(&post);
        assert!(loaded.content.contains("<h1>Title</h1>"));
        assert!(loaded.content.contains("<em>text</em>"));
    }

    #[test]
    fn test_load_post_missing_markdown_keeps_fallback() {
        let post = Post {
            id: "a".into(),
            html_content: "missing.md".into(),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let loaded = ContentLoader::new(dir.path()).load_post(&post);
        assert_eq!(loaded.content, FALLBACK_CONTENT);
    }
}
