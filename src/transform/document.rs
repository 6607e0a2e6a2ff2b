//! Standalone page assembly and serialization

use crate::transform::{build_element, select_all};
use crate::TransformError;
use kuchiki::NodeRef;
use url::Url;

const STYLESHEET_HREF: &str = "./styles/style.css";
const BODY_STYLE: &str = "height:auto;background-color:#ffffff";
const LICENSE_URL: &str = "https://creativecommons.org/licenses/by-sa/3.0/";

/// Turns the page content into a complete offline document
///
/// Adds the doctype, language, charset, title, local stylesheet, page
/// heading and the attribution footer naming the source article.
pub fn assemble(
    document: &NodeRef,
    title: &str,
    source_url: &Url,
    site_name: &str,
) -> Result<(), TransformError> {
    ensure_doctype(document);

    let html = first(document, "html")?;
    if let Some(html) = html.as_element() {
        html.attributes
            .borrow_mut()
            .insert("lang", "en".to_string());
    }

    let head = first(document, "head")?;
    for meta in select_all(&head, "meta[charset]")? {
        meta.as_node().detach();
    }
    if let Some(meta) = build_element(r#"<meta charset="UTF-8">"#, "meta") {
        head.prepend(meta);
    }

    for existing in select_all(&head, "title")? {
        existing.as_node().detach();
    }
    let title_element = element("<title></title>", "title")?;
    title_element.append(NodeRef::new_text(title));
    head.append(title_element);

    let stylesheet = format!(r#"link[rel="stylesheet"][href="{}"]"#, STYLESHEET_HREF);
    if select_all(&head, &stylesheet)?.is_empty() {
        head.append(element(
            &format!(r#"<link rel="stylesheet" href="{}">"#, STYLESHEET_HREF),
            "link",
        )?);
    }

    let body = first(document, "body")?;
    if let Some(body) = body.as_element() {
        let mut attributes = body.attributes.borrow_mut();
        attributes.insert("class", "mw-body".to_string());
        attributes.insert("style", BODY_STYLE.to_string());
    }

    if let Some(content) = select_all(&body, "div")?.into_iter().next() {
        let mut attributes = content.attributes.borrow_mut();
        attributes.remove("class");
        attributes.insert("id", "bodyContent".to_string());
    }

    let heading = element(
        r#"<h1 class="firstHeading" id="firstHeading"></h1>"#,
        "h1",
    )?;
    heading.append(NodeRef::new_text(title));
    body.prepend(heading);

    body.append(footer(title, source_url, site_name)?);

    Ok(())
}

/// Renders the document as HTML text
pub fn serialize(document: &NodeRef) -> String {
    document.to_string()
}

fn ensure_doctype(document: &NodeRef) {
    let has_doctype = document
        .children()
        .any(|child| child.as_doctype().is_some());

    if !has_doctype {
        document.prepend(NodeRef::new_doctype("html", "", ""));
    }
}

fn footer(title: &str, source_url: &Url, site_name: &str) -> Result<NodeRef, TransformError> {
    let footer = element(
        r#"<footer class="mw-body" style="font-size:13px;color:darkgray;text-align:center;margin-bottom:-1px"></footer>"#,
        "footer",
    )?;

    let article = link(source_url.as_str(), title)?;
    let license = link(LICENSE_URL, "CC-BY-SA-3.0")?;

    footer.append(NodeRef::new_text(format!("From the {} article ", site_name)));
    footer.append(article);
    footer.append(NodeRef::new_text(" (provided under "));
    footer.append(license);
    footer.append(NodeRef::new_text(")"));

    Ok(footer)
}

fn link(href: &str, text: &str) -> Result<NodeRef, TransformError> {
    let anchor = element(r#"<a style="color:black"></a>"#, "a")?;
    if let Some(element) = anchor.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert("href", href.to_string());
    }
    anchor.append(NodeRef::new_text(text));
    Ok(anchor)
}

fn first(document: &NodeRef, selector: &str) -> Result<NodeRef, TransformError> {
    select_all(document, selector)?
        .into_iter()
        .next()
        .map(|element| element.as_node().clone())
        .ok_or_else(|| TransformError::Malformed {
            element: selector.to_string(),
            message: "element not found".to_string(),
        })
}

fn element(snippet: &str, tag: &str) -> Result<NodeRef, TransformError> {
    build_element(snippet, tag).ok_or_else(|| TransformError::Malformed {
        element: tag.to_string(),
        message: "could not build element".to_string(),
    })
}
