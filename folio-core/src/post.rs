use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
    #[error("Invalid post id {0:?}: ids may only contain ASCII letters, digits, '-' and '_'")]
    InvalidSlug(String),
    #[error("Duplicate post id {0:?}")]
    DuplicateId(String),
}

/// A blog post as listed in the registry.
///
/// `content` is never part of the registry itself. It is filled on a copy of
/// the record by [`crate::ContentLoader::load_post`] for the duration of one
/// render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub date: String,
    pub header: String,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub preview_content: String,
    pub html_content: String,
    #[serde(skip_deserializing)]
    pub content: String,
    pub id: String,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    posts: Vec<Post>,
}

/// Ordered, read-only list of posts. Built once at startup and shared by
/// reference with the build driver and the server.
#[derive(Debug, Clone, Default)]
pub struct PostRegistry {
    posts: Vec<Post>,
}

impl PostRegistry {
    pub fn new(posts: Vec<Post>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut posts = posts;

        for post in &mut posts {
            if !is_valid_slug(&post.id) {
                return Err(RegistryError::InvalidSlug(post.id.clone()));
            }
            if !seen.insert(post.id.clone()) {
                return Err(RegistryError::DuplicateId(post.id.clone()));
            }
            post.content.clear();
        }

        Ok(Self { posts })
    }

    /// Read a registry from a TOML file made of `[[posts]]` tables.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let data = std::fs::read_to_string(path)?;
        let file: RegistryFile = toml::from_str(&data)?;

        Self::new(file.posts)
    }

    /// Use the registry file when it exists, the built-in posts otherwise.
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!(path = %path.display(), "reading post registry");
            Self::read(path)
        } else {
            tracing::debug!(path = %path.display(), "no registry file, using built-in posts");
            Ok(Self::builtin())
        }
    }

    pub fn builtin() -> Self {
        let posts = vec![
            builtin_post(
                "AUG 26 2024",
                "Rewriting R Functions in C",
                "A guide to using the C API with R to improve performance by rewriting vector operations.",
                "rewriting",
            ),
            builtin_post(
                "JUN 15 2024",
                "Introduction to partial residual plots",
                "Partial residual plots can give you valuble information about your model and relationships in the data like interactions and nonlinear trends. In this post we look at use cases and different ways PRP can be created in ggplot.",
                "partial",
            ),
            builtin_post(
                "JUN 12 2024",
                "Correlation Networks in R",
                "Plotting correlations as networks can give you a good first impression of the interconnectivity of your variables. This is a quick tutorial on how to create correlation networks in R.",
                "networks",
            ),
            builtin_post(
                "JUN 04 2024",
                "Exploring frequency weights in logistic regression",
                "Frequency weights can be used in logistic regression to address class imbalance caused by sampling bias. In this post, we will use simulations to explore how to effectively choose weights and visually understand the benefits of this approach.",
                "weights",
            ),
        ];

        Self { posts }
    }

    /// First post whose id equals `slug`.
    pub fn resolve(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == slug)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a PostRegistry {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

fn builtin_post(date: &str, header: &str, preview: &str, id: &str) -> Post {
    Post {
        date: date.to_string(),
        header: header.to_string(),
        preview_image: format!("/assets/blog/{id}/thumbnail.png"),
        preview_content: preview.to_string(),
        html_content: format!("assets/blog/{id}/content.html"),
        content: String::new(),
        id: id.to_string(),
    }
}

/// Ids double as output directory names, so only a conservative character
/// set is accepted.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str) -> Post {
        Post {
            date: "JAN 01 2024".into(),
            header: format!("Post {id}"),
            html_content: format!("posts/{id}.html"),
            id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_every_registered_post() {
        let registry = PostRegistry::builtin();
        for post in &registry {
            let found = registry.resolve(&post.id).unwrap();
            assert_eq!(found, post);
            assert!(found.content.is_empty());
        }
    }

    #[test]
    fn test_resolve_unknown_slug_is_none() {
        let registry = PostRegistry::builtin();
        assert!(registry.resolve("does-not-exist").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_rejects_traversal_and_separators() {
        for bad in ["../etc", "a/b", "a\\b", "..", ".", "", "with space"] {
            let err = PostRegistry::new(vec![post(bad)]).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidSlug(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = PostRegistry::new(vec![post("a"), post("b"), post("a")]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_new_clears_content() {
        let mut p = post("a");
        p.content = "body".into();
        let registry = PostRegistry::new(vec![p]).unwrap();
        assert!(registry.resolve("a").unwrap().content.is_empty());
    }

    #[test]
    fn test_read_toml_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.toml");
        std::fs::write(
            &path,
            r#"
[[posts]]
date = "AUG 26 2024"
header = "First"
html_content = "content/first.html"
id = "first"
content = "ignored"

[[posts]]
date = "JUN 15 2024"
header = "Second"
preview_content = "Short summary"
html_content = "content/second.md"
id = "second"
"#,
        )
        .unwrap();

        let registry = PostRegistry::read(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.posts()[0].id, "first");
        assert!(registry.posts()[0].content.is_empty());
        assert_eq!(registry.resolve("second").unwrap().preview_content, "Short summary");
    }

    #[test]
    fn test_load_or_builtin_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = PostRegistry::load_or_builtin(dir.path().join("missing.toml")).unwrap();
        assert_eq!(registry.len(), PostRegistry::builtin().len());
    }
}
