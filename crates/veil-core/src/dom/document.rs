#![forbid(unsafe_code)]

//! Retained element tree with focus, document-level keydown listeners, and
//! bubbling click handlers.
//!
//! [`Document`] is a cheap, cloneable handle (`Rc<RefCell<..>>`). It is
//! single-threaded by construction.
//!
//! # Invariants
//!
//! 1. The root element exists for the document's whole lifetime and cannot
//!    be removed.
//! 2. `active_element()` always refers to a live element or is `None`;
//!    removing the focused subtree clears focus.
//! 3. Listener and handler callbacks run with no internal borrow held, so a
//!    callback may freely query or mutate the document (including removing
//!    itself or other listeners).
//! 4. A key listener removed during a dispatch does not run later in that
//!    same dispatch.
//! 5. Callbacks dropped by the document (listener removal, subtree removal)
//!    are dropped after the internal borrow is released.
//!
//! # Default actions
//!
//! After keydown listeners run, an un-prevented Tab moves focus to the next
//! tabbable element in document order (Shift+Tab / BackTab: previous). Past
//! either end focus leaves the document (`active_element()` becomes `None`).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use veil_style::InlineStyle;

use super::focus::{is_focusable, is_tabbable};
use super::node::{Fragment, Node, Tag};
use crate::event::{Event, KeyEvent};

/// Identifier of a live element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Identifier of a registered keydown listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Document-level keydown listener.
pub type KeyListener = dyn Fn(&KeyEvent, &mut KeyDispatch);

/// Element click handler.
pub type ClickHandler = dyn Fn(&mut ClickDispatch);

/// Mutable dispatch context handed to key listeners.
#[derive(Debug, Default)]
pub struct KeyDispatch {
    default_prevented: bool,
}

impl KeyDispatch {
    /// Suppress the document's default action (Tab traversal).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Mutable dispatch context handed to click handlers while bubbling.
#[derive(Debug)]
pub struct ClickDispatch {
    target: ElementId,
    current: ElementId,
    propagation_stopped: bool,
}

impl ClickDispatch {
    /// The element originally clicked.
    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The element whose handler is running.
    #[must_use]
    pub fn current_target(&self) -> ElementId {
        self.current
    }

    /// Stop the click from reaching ancestors.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Summary of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub handlers_run: usize,
}

#[derive(Debug)]
struct ElementData {
    tag: Tag,
    text: Option<String>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    style: InlineStyle,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl ElementData {
    fn new(tag: Tag, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            text: None,
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            style: InlineStyle::new(),
            parent,
            children: Vec::new(),
        }
    }
}

struct DocumentInner {
    nodes: AHashMap<ElementId, ElementData>,
    root: ElementId,
    next_element: u64,
    active: Option<ElementId>,
    key_listeners: Vec<(ListenerId, Rc<KeyListener>)>,
    next_listener: u64,
    click_handlers: AHashMap<ElementId, Rc<ClickHandler>>,
}

impl DocumentInner {
    fn new() -> Self {
        let root = ElementId(0);
        let mut nodes = AHashMap::new();
        nodes.insert(root, ElementData::new(Tag::Body, None));
        Self {
            nodes,
            root,
            next_element: 1,
            active: None,
            key_listeners: Vec::new(),
            next_listener: 1,
            click_handlers: AHashMap::new(),
        }
    }

    fn alloc(&mut self, tag: Tag, parent: ElementId) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        self.nodes.insert(id, ElementData::new(tag, Some(parent)));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    fn insert(&mut self, parent: ElementId, node: &Node) -> ElementId {
        let id = self.alloc(node.tag, parent);
        if let Some(data) = self.nodes.get_mut(&id) {
            data.text.clone_from(&node.text);
            data.attrs.clone_from(&node.attrs);
            data.classes.clone_from(&node.classes);
        }
        for child in &node.children {
            self.insert(id, child);
        }
        id
    }

    /// Descendants of `id` in document order, excluding `id`.
    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.nodes.get(&id) {
            Some(data) => data.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(data) = self.nodes.get(&next) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }

    /// `id` followed by its ancestors up to the root.
    fn ancestors_inclusive(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.nodes.get(&current).and_then(|d| d.parent);
        }
        out
    }

    fn is_tabbable(&self, id: ElementId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|d| is_tabbable(d.tag, &d.attrs))
    }
}

/// Handle to a retained element tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("elements", &inner.nodes.len())
            .field("active", &inner.active)
            .field("key_listeners", &inner.key_listeners.len())
            .field("click_handlers", &inner.click_handlers.len())
            .finish()
    }
}

impl Document {
    /// Create a document containing only its root (`Tag::Body`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner::new())),
        }
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.inner.borrow().root
    }

    /// Number of live elements, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Whether the document holds nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    // --- Tree Construction ---

    /// Insert `node` (recursively) as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn append(&self, parent: ElementId, node: &Node) -> Option<ElementId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&parent) {
            return None;
        }
        Some(inner.insert(parent, node))
    }

    /// Insert every node of `fragment` under `parent`, returning the new top-level ids.
    pub fn append_fragment(&self, parent: ElementId, fragment: &Fragment) -> Vec<ElementId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&parent) {
            return Vec::new();
        }
        fragment
            .nodes()
            .iter()
            .map(|node| inner.insert(parent, node))
            .collect()
    }

    /// Create an empty element of `tag` under `parent`.
    pub fn create_element(&self, parent: ElementId, tag: Tag) -> Option<ElementId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&parent) {
            return None;
        }
        Some(inner.alloc(tag, parent))
    }

    /// Remove `id` and its subtree. The root cannot be removed.
    pub fn remove(&self, id: ElementId) -> bool {
        let dropped_handlers = {
            let mut inner = self.inner.borrow_mut();
            if id == inner.root || !inner.nodes.contains_key(&id) {
                return false;
            }
            let mut subtree = inner.descendants(id);
            subtree.push(id);

            if let Some(parent) = inner.nodes.get(&id).and_then(|d| d.parent)
                && let Some(p) = inner.nodes.get_mut(&parent)
            {
                p.children.retain(|child| *child != id);
            }

            let mut dropped = Vec::new();
            for node in &subtree {
                inner.nodes.remove(node);
                if let Some(handler) = inner.click_handlers.remove(node) {
                    dropped.push(handler);
                }
            }
            if let Some(active) = inner.active
                && !inner.nodes.contains_key(&active)
            {
                inner.active = None;
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(element = id.id(), removed = subtree.len(), "document.remove");

            dropped
        };
        drop(dropped_handlers);
        true
    }

    // --- Element Queries ---

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.inner.borrow().nodes.contains_key(&id)
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn is_inclusive_descendant(&self, ancestor: ElementId, node: ElementId) -> bool {
        let inner = self.inner.borrow();
        inner.nodes.contains_key(&ancestor)
            && inner.ancestors_inclusive(node).contains(&ancestor)
    }

    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.borrow().nodes.get(&id).and_then(|d| d.parent)
    }

    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .nodes
            .get(&id)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    }

    /// Descendants in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.borrow().descendants(id)
    }

    #[must_use]
    pub fn tag(&self, id: ElementId) -> Option<Tag> {
        self.inner.borrow().nodes.get(&id).map(|d| d.tag)
    }

    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<String> {
        self.inner.borrow().nodes.get(&id).and_then(|d| d.text.clone())
    }

    /// Concatenated text of `id` and its descendants in document order.
    #[must_use]
    pub fn text_content(&self, id: ElementId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        let own = std::iter::once(id).chain(inner.descendants(id));
        for node in own {
            if let Some(text) = inner.nodes.get(&node).and_then(|d| d.text.as_deref()) {
                out.push_str(text);
            }
        }
        out
    }

    pub fn set_text(&self, id: ElementId, text: impl Into<String>) -> bool {
        match self.inner.borrow_mut().nodes.get_mut(&id) {
            Some(data) => {
                data.text = Some(text.into());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn attr(&self, id: ElementId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .nodes
            .get(&id)
            .and_then(|d| d.attrs.get(name).cloned())
    }

    pub fn set_attr(&self, id: ElementId, name: impl Into<String>, value: impl Into<String>) -> bool {
        match self.inner.borrow_mut().nodes.get_mut(&id) {
            Some(data) => {
                data.attrs.insert(name.into(), value.into());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn classes(&self, id: ElementId) -> Vec<String> {
        self.inner
            .borrow()
            .nodes
            .get(&id)
            .map(|d| d.classes.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&id)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// Add or remove `class` on `id`.
    pub fn toggle_class(&self, id: ElementId, class: &str, present: bool) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(data) = inner.nodes.get_mut(&id) else {
            return false;
        };
        let has = data.classes.iter().any(|c| c == class);
        if present && !has {
            data.classes.push(class.to_string());
        } else if !present && has {
            data.classes.retain(|c| c != class);
        }
        true
    }

    #[must_use]
    pub fn style(&self, id: ElementId) -> Option<InlineStyle> {
        self.inner.borrow().nodes.get(&id).map(|d| d.style.clone())
    }

    /// Mutate the inline style of `id` in place.
    pub fn update_style(&self, id: ElementId, f: impl FnOnce(&mut InlineStyle)) -> bool {
        match self.inner.borrow_mut().nodes.get_mut(&id) {
            Some(data) => {
                f(&mut data.style);
                true
            }
            None => false,
        }
    }

    /// First element (document order) carrying `class`.
    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Option<ElementId> {
        self.find_all_by_class(class).into_iter().next()
    }

    #[must_use]
    pub fn find_all_by_class(&self, class: &str) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        inner
            .descendants(inner.root)
            .into_iter()
            .filter(|id| {
                inner
                    .nodes
                    .get(id)
                    .is_some_and(|d| d.classes.iter().any(|c| c == class))
            })
            .collect()
    }

    /// First element (document order) whose own text equals `text`.
    #[must_use]
    pub fn find_by_text(&self, text: &str) -> Option<ElementId> {
        let inner = self.inner.borrow();
        inner.descendants(inner.root).into_iter().find(|id| {
            inner
                .nodes
                .get(id)
                .is_some_and(|d| d.text.as_deref() == Some(text))
        })
    }

    /// Focusable descendants of `scope` in document order.
    ///
    /// See [`focus`](super::focus) for the matching rules.
    #[must_use]
    pub fn query_focusable(&self, scope: ElementId) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        inner
            .descendants(scope)
            .into_iter()
            .filter(|id| {
                inner
                    .nodes
                    .get(id)
                    .is_some_and(|d| is_focusable(d.tag, &d.attrs))
            })
            .collect()
    }

    // --- Focus ---

    #[must_use]
    pub fn active_element(&self) -> Option<ElementId> {
        self.inner.borrow().active
    }

    /// Move focus to `id`. Returns `false` (focus unchanged) if `id` is not live.
    pub fn focus(&self, id: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&id) {
            return false;
        }
        inner.active = Some(id);
        true
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().active = None;
    }

    fn default_tab(&self, reverse: bool) {
        let mut inner = self.inner.borrow_mut();
        let order = inner.descendants(inner.root);
        let start = inner
            .active
            .and_then(|active| order.iter().position(|id| *id == active));
        let next = if reverse {
            let end = start.unwrap_or(order.len());
            order[..end]
                .iter()
                .rev()
                .find(|id| inner.is_tabbable(**id))
                .copied()
        } else {
            let begin = start.map_or(0, |s| s + 1);
            order[begin..]
                .iter()
                .find(|id| inner.is_tabbable(**id))
                .copied()
        };
        inner.active = next;
    }

    // --- Listeners ---

    /// Register a document-level keydown listener.
    ///
    /// The listener stays registered until the returned guard is dropped.
    pub fn add_key_listener(
        &self,
        listener: impl Fn(&KeyEvent, &mut KeyDispatch) + 'static,
    ) -> ListenerGuard {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.key_listeners.push((id, Rc::new(listener)));

        #[cfg(feature = "tracing")]
        tracing::trace!(
            listener = id.0,
            total = inner.key_listeners.len(),
            "document.add_key_listener"
        );

        ListenerGuard {
            doc: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered keydown listeners.
    #[must_use]
    pub fn key_listener_count(&self) -> usize {
        self.inner.borrow().key_listeners.len()
    }

    /// Install (replacing) the click handler of `id`.
    pub fn set_click_handler(
        &self,
        id: ElementId,
        handler: impl Fn(&mut ClickDispatch) + 'static,
    ) -> bool {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            if !inner.nodes.contains_key(&id) {
                return false;
            }
            inner.click_handlers.insert(id, Rc::new(handler))
        };
        drop(previous);
        true
    }

    /// Number of elements with a click handler.
    #[must_use]
    pub fn click_handler_count(&self) -> usize {
        self.inner.borrow().click_handlers.len()
    }

    // --- Dispatch ---

    pub fn dispatch(&self, event: &Event) -> DispatchOutcome {
        match event {
            Event::Key(key) => self.dispatch_key(key),
            Event::Click(target) => self.click(*target),
        }
    }

    /// Deliver a key event to every keydown listener, then run the default action.
    pub fn dispatch_key(&self, event: &KeyEvent) -> DispatchOutcome {
        let mut dispatch = KeyDispatch::default();
        let mut handlers_run = 0;

        if event.is_keydown() {
            let snapshot: Vec<(ListenerId, Rc<KeyListener>)> =
                self.inner.borrow().key_listeners.clone();
            for (id, listener) in snapshot {
                let still_registered = self
                    .inner
                    .borrow()
                    .key_listeners
                    .iter()
                    .any(|(registered, _)| *registered == id);
                if !still_registered {
                    continue;
                }
                listener(event, &mut dispatch);
                handlers_run += 1;
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(
                code = ?event.code,
                handlers_run,
                prevented = dispatch.default_prevented,
                "document.dispatch_key"
            );

            if !dispatch.default_prevented && event.is_tab() {
                self.default_tab(event.is_reverse_tab());
            }
        }

        DispatchOutcome {
            default_prevented: dispatch.default_prevented,
            propagation_stopped: false,
            handlers_run,
        }
    }

    /// Click `target`, bubbling through its ancestors until a handler stops propagation.
    pub fn click(&self, target: ElementId) -> DispatchOutcome {
        let path = {
            let inner = self.inner.borrow();
            if !inner.nodes.contains_key(&target) {
                return DispatchOutcome::default();
            }
            inner.ancestors_inclusive(target)
        };

        let mut dispatch = ClickDispatch {
            target,
            current: target,
            propagation_stopped: false,
        };
        let mut handlers_run = 0;
        for node in path {
            let handler = self.inner.borrow().click_handlers.get(&node).cloned();
            if let Some(handler) = handler {
                dispatch.current = node;
                handler(&mut dispatch);
                handlers_run += 1;
                if dispatch.propagation_stopped {
                    break;
                }
            }
        }

        DispatchOutcome {
            default_prevented: false,
            propagation_stopped: dispatch.propagation_stopped,
            handlers_run,
        }
    }
}

/// RAII registration of a keydown listener.
#[must_use = "dropping the guard removes the listener"]
pub struct ListenerGuard {
    doc: Weak<RefCell<DocumentInner>>,
    id: ListenerId,
}

impl ListenerGuard {
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(doc) = self.doc.upgrade() else {
            return;
        };
        let removed = {
            let mut inner = doc.borrow_mut();
            let idx = inner
                .key_listeners
                .iter()
                .position(|(registered, _)| *registered == self.id);
            idx.map(|i| inner.key_listeners.remove(i))
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(listener = self.id.0, "document.remove_key_listener");

        drop(removed);
    }
}
