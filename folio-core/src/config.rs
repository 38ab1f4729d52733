use serde::{Deserialize, Serialize};

/// The `[site]` table of `folio.toml`, available to every template as `site`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub author: String,
    pub tagline: Option<String>,
    /// Paragraphs shown on the about page.
    pub about: Vec<String>,
    pub links: Vec<Link>,
    pub projects: Vec<Project>,
    pub publications: Vec<Publication>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".into(),
            author: "Anonymous".into(),
            tagline: None,
            about: Vec::new(),
            links: Vec::new(),
            projects: Vec::new(),
            publications: Vec::new(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Link {
    pub text: String,
    pub link: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub link: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Publication {
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub venue: String,
    pub year: Option<u16>,
    pub link: Option<String>,
}
