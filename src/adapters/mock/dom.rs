//! In-memory element tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::traits::{Element, ElementRef, ElementRole};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// In-memory element for testing.
///
/// Elements are always handled through `Arc`; builder methods take and
/// return the `Arc` so fixtures read top-down:
///
/// ```ignore
/// let cell = MockElement::cell(["subjectcol-column"])
///     .with_title("Quarterly Report")
///     .with_text("Quarterly Rep…");
/// row.append_child(&cell);
/// ```
pub struct MockElement {
    id: u64,
    role: ElementRole,
    classes: Mutex<Vec<String>>,
    attributes: Mutex<HashMap<String, String>>,
    text: Mutex<Option<String>>,
    parent: Mutex<Weak<MockElement>>,
    children: Mutex<Vec<Arc<MockElement>>>,
}

impl MockElement {
    /// Create a detached element with the given role and class tokens.
    pub fn new<I, S>(role: ElementRole, classes: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            role,
            classes: Mutex::new(classes.into_iter().map(Into::into).collect()),
            attributes: Mutex::new(HashMap::new()),
            text: Mutex::new(None),
            parent: Mutex::new(Weak::new()),
            children: Mutex::new(Vec::new()),
        })
    }

    pub fn header<I, S>(classes: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ElementRole::HeaderCell, classes)
    }

    pub fn cell<I, S>(classes: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ElementRole::Cell, classes)
    }

    pub fn row() -> Arc<Self> {
        Self::new(ElementRole::Row, Vec::<String>::new())
    }

    pub fn other() -> Arc<Self> {
        Self::new(ElementRole::Other, Vec::<String>::new())
    }

    /// Set the tooltip attribute.
    pub fn with_title(self: Arc<Self>, title: impl Into<String>) -> Arc<Self> {
        self.set_attribute("title", title);
        self
    }

    /// Set the visible text.
    pub fn with_text(self: Arc<Self>, text: impl Into<String>) -> Arc<Self> {
        *self.text.lock().unwrap() = Some(text.into());
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .lock()
            .unwrap()
            .insert(name.into(), value.into());
    }

    /// Replace the class tokens.
    pub fn set_classes<I, S>(&self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.classes.lock().unwrap() = classes.into_iter().map(Into::into).collect();
    }

    /// Append `child`, moving it out of its previous parent if it had one.
    pub fn append_child(self: &Arc<Self>, child: &Arc<MockElement>) {
        let old_parent = child.parent.lock().unwrap().upgrade();
        if let Some(old_parent) = old_parent {
            old_parent.remove_child(child);
        }
        *child.parent.lock().unwrap() = Arc::downgrade(self);
        self.children.lock().unwrap().push(Arc::clone(child));
    }

    /// Remove `child`. Returns whether it was a child of this element.
    pub fn remove_child(&self, child: &Arc<MockElement>) -> bool {
        let mut children = self.children.lock().unwrap();
        let before = children.len();
        children.retain(|c| c.id != child.id);
        let removed = children.len() != before;
        drop(children);
        if removed {
            *child.parent.lock().unwrap() = Weak::new();
        }
        removed
    }

    /// Direct children as concrete handles.
    pub fn children_arcs(&self) -> Vec<Arc<MockElement>> {
        self.children.lock().unwrap().clone()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.lock().unwrap().len()
    }
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("classes", &*self.classes.lock().unwrap())
            .finish()
    }
}

impl Element for MockElement {
    fn role(&self) -> ElementRole {
        self.role
    }

    fn class_tokens(&self) -> Vec<String> {
        self.classes.lock().unwrap().clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.lock().unwrap().get(name).cloned()
    }

    fn text_content(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }

    fn parent(&self) -> Option<ElementRef> {
        self.parent
            .lock()
            .unwrap()
            .upgrade()
            .map(|p| p as ElementRef)
    }

    fn children(&self) -> Vec<ElementRef> {
        self.children
            .lock()
            .unwrap()
            .iter()
            .map(|c| Arc::clone(c) as ElementRef)
            .collect()
    }
}
