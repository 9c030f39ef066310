//! Element capability: the read-only view of a node in the host UI tree.
//!
//! The bridge only ever needs a node's role, its class tokens, a couple of
//! attributes and its position in the tree. Everything else about the host's
//! element model stays on the host side.

use std::fmt;
use std::sync::Arc;

/// Shared handle to a host element.
pub type ElementRef = Arc<dyn Element>;

/// Suffix that marks a class token as a column identifier.
pub const COLUMN_CLASS_SUFFIX: &str = "-column";

/// What kind of node an element is, as far as the table is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// Column title cell in the header row.
    HeaderCell,
    /// Data cell in a message row.
    Cell,
    /// A message row.
    Row,
    /// Anything else (wrappers, icons, text spans, the table itself).
    Other,
}

/// Read-only capability over a host element.
pub trait Element: Send + Sync + fmt::Debug {
    /// Role of this node within the table.
    fn role(&self) -> ElementRole;

    /// Class-like tokens in document order.
    fn class_tokens(&self) -> Vec<String>;

    /// Value of a named attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Visible text content.
    fn text_content(&self) -> Option<String>;

    /// Parent element, `None` at the root or once detached.
    fn parent(&self) -> Option<ElementRef>;

    /// Child elements in document order.
    fn children(&self) -> Vec<ElementRef>;

    fn is_header_cell(&self) -> bool {
        self.role() == ElementRole::HeaderCell
    }

    fn is_cell(&self) -> bool {
        self.role() == ElementRole::Cell
    }

    /// Tooltip text.
    fn title(&self) -> Option<String> {
        self.attribute("title")
    }
}

/// Innermost table cell at or above `element`.
pub fn closest_cell(element: &ElementRef) -> Option<ElementRef> {
    let mut current = Some(Arc::clone(element));
    while let Some(node) = current {
        if node.is_cell() {
            return Some(node);
        }
        current = node.parent();
    }
    None
}

/// Whether `element` is, or has a descendant that is, a header cell.
pub fn contains_header_cell(element: &ElementRef) -> bool {
    let mut stack = vec![Arc::clone(element)];
    while let Some(node) = stack.pop() {
        if node.is_header_cell() {
            return true;
        }
        stack.extend(node.children());
    }
    false
}

/// Header cells below `root`, in document order.
pub fn header_cells_under(root: &ElementRef) -> Vec<ElementRef> {
    let mut found = Vec::new();
    let mut stack = vec![Arc::clone(root)];
    while let Some(node) = stack.pop() {
        if node.is_header_cell() {
            found.push(Arc::clone(&node));
        }
        // Reverse so the leftmost child is visited first.
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
    found
}

/// Class tokens of `element` that identify a column.
pub fn column_tokens(element: &dyn Element) -> Vec<String> {
    element
        .class_tokens()
        .into_iter()
        .filter(|token| token.ends_with(COLUMN_CLASS_SUFFIX))
        .collect()
}

/// Text a filter should use for `cell`: its tooltip when present, otherwise
/// its visible text, otherwise an empty string.
pub fn cell_text(cell: &dyn Element) -> String {
    cell.title()
        .filter(|title| !title.is_empty())
        .or_else(|| cell.text_content())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockElement;

    #[test]
    fn test_closest_cell_walks_up() {
        let cell = MockElement::cell(["subjectcol-column"]);
        let span = MockElement::other();
        cell.append_child(&span);

        let target: ElementRef = span;
        let found = closest_cell(&target).expect("cell ancestor");
        assert!(found.is_cell());
        assert_eq!(found.class_tokens(), vec!["subjectcol-column".to_string()]);
    }

    #[test]
    fn test_closest_cell_none_outside_cells() {
        let row = MockElement::row();
        let target: ElementRef = row;
        assert!(closest_cell(&target).is_none());
    }

    #[test]
    fn test_contains_header_cell_nested() {
        let wrapper = MockElement::other();
        let inner = MockElement::other();
        wrapper.append_child(&inner);
        inner.append_child(&MockElement::header(["subjectcol-column"]));

        let root: ElementRef = wrapper;
        assert!(contains_header_cell(&root));

        let row: ElementRef = MockElement::row();
        assert!(!contains_header_cell(&row));
    }

    #[test]
    fn test_header_cells_under_document_order() {
        let root = MockElement::other();
        let first = MockElement::header(["a-column"]);
        let group = MockElement::other();
        let second = MockElement::header(["b-column"]);
        let third = MockElement::header(["c-column"]);
        root.append_child(&first);
        root.append_child(&group);
        group.append_child(&second);
        root.append_child(&third);

        let root: ElementRef = root;
        let tokens: Vec<_> = header_cells_under(&root)
            .iter()
            .flat_map(|h| h.class_tokens())
            .collect();
        assert_eq!(tokens, vec!["a-column", "b-column", "c-column"]);
    }

    #[test]
    fn test_column_tokens_filters_suffix() {
        let header = MockElement::header(["tree-cell", "subjectcol-column", "sortable"]);
        assert_eq!(column_tokens(header.as_ref()), vec!["subjectcol-column"]);
    }

    #[test]
    fn test_cell_text_prefers_title() {
        let cell = MockElement::cell(["subjectcol-column"])
            .with_title("Quarterly Report")
            .with_text("Quarterly Rep…");
        assert_eq!(cell_text(cell.as_ref()), "Quarterly Report");
    }

    #[test]
    fn test_cell_text_falls_back() {
        let with_text = MockElement::cell(["x-column"]).with_text("visible");
        assert_eq!(cell_text(with_text.as_ref()), "visible");

        let empty_title = MockElement::cell(["x-column"])
            .with_title("")
            .with_text("visible");
        assert_eq!(cell_text(empty_title.as_ref()), "visible");

        let bare = MockElement::cell(["x-column"]);
        assert_eq!(cell_text(bare.as_ref()), "");
    }
}
