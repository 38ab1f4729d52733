use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    About,
    Projects,
    Blog,
    BlogPost,
    Publications,
}

impl PageKind {
    pub fn template_name(&self) -> &'static str {
        match self {
            PageKind::About => "about.html",
            PageKind::Projects => "projects.html",
            PageKind::Blog => "blog.html",
            PageKind::BlogPost => "post.html",
            PageKind::Publications => "publications.html",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageKind::About => "About",
            PageKind::Projects => "Projects",
            PageKind::Blog | PageKind::BlogPost => "Blog",
            PageKind::Publications => "Publications",
        }
    }
}

/// A fixed page: where it lives and what renders it.
#[derive(Debug, Clone, Copy)]
pub struct PageDef {
    pub path: &'static str,
    pub kind: PageKind,
    /// When serving, answer with a redirect to this path instead of
    /// rendering. Static builds always render.
    pub redirect_to: Option<&'static str>,
}

impl PageDef {
    /// `root/<path>/index.html`
    pub fn output_file(&self, root: &Path) -> PathBuf {
        root.join(self.path.trim_matches('/')).join("index.html")
    }
}

/// Every fixed page, in build order. `/` duplicates `/about/` on disk.
pub const PAGES: &[PageDef] = &[
    PageDef {
        path: "/about/",
        kind: PageKind::About,
        redirect_to: None,
    },
    PageDef {
        path: "/",
        kind: PageKind::About,
        redirect_to: Some("/about/"),
    },
    PageDef {
        path: "/publications/",
        kind: PageKind::Publications,
        redirect_to: None,
    },
    PageDef {
        path: "/blog/",
        kind: PageKind::Blog,
        redirect_to: None,
    },
    PageDef {
        path: "/projects/",
        kind: PageKind::Projects,
        redirect_to: None,
    },
];

/// URL prefix shared by the blog index and post pages.
pub const BLOG_PREFIX: &str = "/blog/";

/// `root/blog/<id>/index.html`
pub fn post_output_file(root: &Path, id: &str) -> PathBuf {
    root.join(BLOG_PREFIX.trim_matches('/'))
        .join(id)
        .join("index.html")
}
