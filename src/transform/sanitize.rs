//! Removal of wiki chrome and layout normalization
//!
//! The rules are keyed on tag names plus MediaWiki class markers. Running the
//! pass on an already sanitized document changes nothing.

use crate::crawler::CrawlPolicy;
use crate::transform::{class_list, select_all, unwrap_node};
use crate::TransformError;
use kuchiki::traits::*;
use kuchiki::NodeRef;

/// Elements dropped together with their content
const REMOVED_ELEMENTS: &[&str] = &[
    "div.printfooter",
    "div.catlinks",
    "div.noprint",
    "div.magnify",
    "table.noprint",
    "table.ambox",
    "input.toctogglecheckbox",
    "style",
];

/// Wrappers replaced by their children
const UNWRAPPED_ELEMENTS: &[&str] = &["div.mw-highlight"];

/// Deepest table-of-contents level carrying a `toclevel-N` class
const MAX_TOC_LEVEL: usize = 6;

/// Spans with one of these classes are removed
const REMOVED_SPAN_CLASSES: &[&str] = &["mw-editsection", "toctogglespan", "noprint"];

const TAB_REPLACEMENT: &str = "    ";

const LIST_STYLE: &str = "list-style-image:none";

/// What the sanitizer did to a page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Elements and comments removed
    pub removed: usize,
    /// Wrappers replaced by their children
    pub unwrapped: usize,
    /// Elements whose attributes were rewritten
    pub restyled: usize,
    /// Elements left as they were because a rule could not apply
    pub issues: Vec<TransformError>,
}

impl SanitizeReport {
    /// Number of elements skipped for reasons other than an absent attribute
    pub fn malformed_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, TransformError::Malformed { .. }))
            .count()
    }
}

/// What happens to a span after its classes were inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanAction {
    Unwrap,
    DropClass,
    Remove,
}

/// Sanitizes a parsed page in place
///
/// # Rules
///
/// - Remove navigation chrome, print-only blocks, magnifier icons, TOC toggles,
///   inline stylesheets and comments
/// - Unwrap highlighted-code containers and decoration spans
/// - Strip `toclevel-N` classes from table-of-contents items
/// - Replace tabs in code blocks; optionally force a code font
/// - Flatten tables when the policy asks for it
/// - Disable image bullets on every list
///
/// A rule that cannot apply to one element leaves that element unchanged and
/// is recorded in the report.
pub fn sanitize(document: &NodeRef, policy: &CrawlPolicy) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    remove_elements(document, &mut report);
    remove_comments(document, &mut report);
    unwrap_wrappers(document, &mut report);
    clean_toc_items(document, &mut report);
    clean_spans(document, policy, &mut report);
    normalize_code_blocks(document, policy, &mut report);

    if policy.flatten_tables {
        flatten_tables(document, &mut report);
    }

    restyle_lists(document, &mut report);

    for issue in &report.issues {
        match issue {
            TransformError::MissingAttribute { .. } => tracing::trace!("Left unchanged: {}", issue),
            TransformError::Malformed { .. } => tracing::warn!("Left unchanged: {}", issue),
        }
    }

    report
}

fn remove_elements(document: &NodeRef, report: &mut SanitizeReport) {
    for selector in REMOVED_ELEMENTS {
        match select_all(document, selector) {
            Ok(elements) => {
                for element in elements {
                    element.as_node().detach();
                    report.removed += 1;
                }
            }
            Err(e) => report.issues.push(e),
        }
    }
}

fn remove_comments(document: &NodeRef, report: &mut SanitizeReport) {
    let comments: Vec<NodeRef> = document
        .descendants()
        .filter(|node| node.as_comment().is_some())
        .collect();

    for comment in comments {
        comment.detach();
        report.removed += 1;
    }
}

fn unwrap_wrappers(document: &NodeRef, report: &mut SanitizeReport) {
    for selector in UNWRAPPED_ELEMENTS {
        match select_all(document, selector) {
            Ok(elements) => {
                for element in elements {
                    unwrap_node(element.as_node());
                    report.unwrapped += 1;
                }
            }
            Err(e) => report.issues.push(e),
        }
    }
}

fn clean_toc_items(document: &NodeRef, report: &mut SanitizeReport) {
    let levels: Vec<String> = (0..=MAX_TOC_LEVEL)
        .map(|level| format!("toclevel-{}", level))
        .collect();

    let items = match select_all(document, "li[class]") {
        Ok(items) => items,
        Err(e) => {
            report.issues.push(e);
            return;
        }
    };

    for item in items {
        let classes = match class_list(&item) {
            Ok(classes) => classes,
            Err(e) => {
                report.issues.push(e);
                continue;
            }
        };

        if classes.iter().any(|class| levels.contains(class)) {
            item.attributes.borrow_mut().remove("class");
            report.restyled += 1;
        }
    }
}

fn clean_spans(document: &NodeRef, policy: &CrawlPolicy, report: &mut SanitizeReport) {
    let spans = match select_all(document, "span") {
        Ok(spans) => spans,
        Err(e) => {
            report.issues.push(e);
            return;
        }
    };

    // Innermost first, so a span emptied by its children is seen empty
    for span in spans.into_iter().rev() {
        let node = span.as_node();

        if is_empty_span(node) {
            node.detach();
            report.removed += 1;
            continue;
        }

        let classes = match class_list(&span) {
            Ok(classes) => classes,
            Err(e) => {
                report.issues.push(e);
                continue;
            }
        };

        match span_action(&classes, policy.unwrap_toc_numbers) {
            Some(SpanAction::Unwrap) => {
                unwrap_node(node);
                report.unwrapped += 1;
            }
            Some(SpanAction::DropClass) => {
                span.attributes.borrow_mut().remove("class");
                report.restyled += 1;
            }
            Some(SpanAction::Remove) => {
                node.detach();
                report.removed += 1;
            }
            None => {}
        }
    }
}

/// A span with no text and no embedded image carries nothing worth keeping
fn is_empty_span(node: &NodeRef) -> bool {
    node.text_contents().is_empty()
        && node
            .select("img")
            .map(|mut images| images.next().is_none())
            .unwrap_or(true)
}

/// The first class that matches a rule decides what happens to the span
fn span_action(classes: &[String], unwrap_toc_numbers: bool) -> Option<SpanAction> {
    classes.iter().find_map(|class| {
        if class.len() <= 2
            || class == "toctext"
            || (unwrap_toc_numbers && class == "tocnumber")
        {
            Some(SpanAction::Unwrap)
        } else if class == "mw-headline" {
            Some(SpanAction::DropClass)
        } else if class.contains("mathml") || REMOVED_SPAN_CLASSES.contains(&class.as_str()) {
            Some(SpanAction::Remove)
        } else {
            None
        }
    })
}

fn normalize_code_blocks(document: &NodeRef, policy: &CrawlPolicy, report: &mut SanitizeReport) {
    let blocks = match select_all(document, "pre") {
        Ok(blocks) => blocks,
        Err(e) => {
            report.issues.push(e);
            return;
        }
    };

    for block in blocks {
        for text in block.as_node().descendants().text_nodes() {
            let mut text = text.borrow_mut();
            if text.contains('\t') {
                *text = text.replace('\t', TAB_REPLACEMENT);
            }
        }

        if let Some(font) = &policy.code_font {
            let style = format!("font-family:'{}'", font);
            let mut attributes = block.attributes.borrow_mut();
            if attributes.get("style") != Some(style.as_str()) {
                attributes.insert("style", style);
                report.restyled += 1;
            }
        }
    }
}

/// Replaces every table with the plain content of its cells
fn flatten_tables(document: &NodeRef, report: &mut SanitizeReport) {
    let tables = match select_all(document, "table") {
        Ok(tables) => tables,
        Err(e) => {
            report.issues.push(e);
            return;
        }
    };

    for table in tables {
        let node = table.as_node();
        match select_all(node, "td, th, tr, thead, tbody, tfoot") {
            Ok(parts) => {
                for part in parts {
                    unwrap_node(part.as_node());
                }
            }
            Err(e) => {
                report.issues.push(e);
                continue;
            }
        }

        unwrap_node(node);
        report.unwrapped += 1;
    }
}

fn restyle_lists(document: &NodeRef, report: &mut SanitizeReport) {
    let lists = match select_all(document, "ul") {
        Ok(lists) => lists,
        Err(e) => {
            report.issues.push(e);
            return;
        }
    };

    for list in lists {
        let mut attributes = list.attributes.borrow_mut();
        if attributes.get("style") != Some(LIST_STYLE) {
            attributes.insert("style", LIST_STYLE.to_string());
            report.restyled += 1;
        }
    }
}
