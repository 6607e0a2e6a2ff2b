//! Discovery of embedded images and math formulas

use crate::transform::{class_list, select_all};
use crate::url::{asset_file_name, math_file_name, WikiResolver};
use crate::TransformError;
use kuchiki::NodeRef;
use std::path::PathBuf;
use url::Url;

/// Kind of embedded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Regular image, stored under `imgs/`
    Image,
    /// Rendered formula, stored under `imgs/maths/`
    Math,
}

impl AssetKind {
    /// Directory of this kind relative to the page directory
    pub fn subdir(&self) -> &'static str {
        match self {
            Self::Image => "imgs",
            Self::Math => "imgs/maths",
        }
    }
}

/// An asset reference found in a page
#[derive(Debug, Clone)]
pub struct AssetRef {
    pub kind: AssetKind,
    /// Resolved remote location
    pub source: Url,
    /// Local file name before any format conversion
    pub file_name: String,
    img: NodeRef,
    anchor: Option<NodeRef>,
}

impl AssetRef {
    /// Path of the asset relative to the page directory
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.kind.subdir()).join(&self.file_name)
    }

    /// Points the document at the local copy named `local_name`
    ///
    /// `srcset` is dropped so the browser cannot pick a remote candidate. An
    /// enclosing anchor links to the same local file.
    pub fn apply(&self, local_name: &str) {
        let local = format!("./{}/{}", self.kind.subdir(), local_name);

        if let Some(img) = self.img.as_element() {
            let mut attributes = img.attributes.borrow_mut();
            attributes.insert("src", local.clone());
            attributes.remove("srcset");
        }

        if let Some(anchor) = self.anchor.as_ref().and_then(|a| a.as_element()) {
            anchor.attributes.borrow_mut().insert("href", local);
        }
    }
}

/// Finds every image and math formula in the document
///
/// Images whose `src` cannot be used are reported and left alone; inline
/// `data:` images are skipped silently.
pub fn collect_assets(
    document: &NodeRef,
    resolver: &WikiResolver,
) -> (Vec<AssetRef>, Vec<TransformError>) {
    let mut assets = Vec::new();
    let mut issues = Vec::new();

    let images = match select_all(document, "img") {
        Ok(images) => images,
        Err(e) => return (assets, vec![e]),
    };

    for img in images {
        let src = match img.attributes.borrow().get("src") {
            Some(src) => src.to_string(),
            None => {
                issues.push(TransformError::MissingAttribute {
                    element: "img".to_string(),
                    attribute: "src",
                });
                continue;
            }
        };

        let source = match resolver.resolve(&src) {
            Ok(url) => url,
            Err(e) => {
                issues.push(TransformError::Malformed {
                    element: "img".to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !matches!(source.scheme(), "http" | "https") {
            continue;
        }

        let kind = match class_list(&img) {
            Ok(classes) if classes.iter().any(|c| c.contains("math")) => AssetKind::Math,
            _ => AssetKind::Image,
        };

        let file_name = match kind {
            AssetKind::Image => asset_file_name(&source),
            AssetKind::Math => math_file_name(&source),
        };
        let file_name = match file_name {
            Ok(name) => name,
            Err(e) => {
                issues.push(TransformError::Malformed {
                    element: "img".to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let anchor = match kind {
            AssetKind::Image => enclosing_anchor(img.as_node()),
            AssetKind::Math => None,
        };

        assets.push(AssetRef {
            kind,
            source,
            file_name,
            img: img.as_node().clone(),
            anchor,
        });
    }

    (assets, issues)
}

fn enclosing_anchor(node: &NodeRef) -> Option<NodeRef> {
    node.ancestors().find(|ancestor| {
        ancestor
            .as_element()
            .map_or(false, |element| &*element.name.local == "a")
    })
}
