use std::collections::{BTreeMap, BTreeSet};

use crate::dom::{Bounds, Document, ElementId, Translate};
use crate::{Error, Result};

use super::engine::ScrollHandle;

/// Description of a node to insert
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub name: Option<String>,
    pub classes: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    /// Layout top in document coordinates
    pub top: f64,
    pub height: f64,
    pub outer_height: Option<f64>,
}

impl NodeSpec {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            height,
            ..Default::default()
        }
    }

    /// Name matched by `#name` references
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// `data-<key>` attribute
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn outer_height(mut self, outer_height: f64) -> Self {
        self.outer_height = Some(outer_height);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: BTreeSet<String>,
    data: BTreeMap<String, String>,
    attrs: BTreeMap<String, String>,
    top: f64,
    height: f64,
    outer_height: f64,
    transform: Option<Translate>,
    attached: bool,
}

impl Node {
    fn matches(&self, selector: &str) -> bool {
        selector.split(',').map(str::trim).any(|s| {
            if let Some(class) = s.strip_prefix('.') {
                self.classes.contains(class)
            } else if let Some(name) = s.strip_prefix('#') {
                self.name.as_deref() == Some(name)
            } else {
                false
            }
        })
    }
}

/// Node tree with layout boxes and the classes/transforms written to it
///
/// Selectors support `.class` and `#name`, comma separated. Reported bounds
/// are visual: the layout top moved by every translation on the element and
/// its ancestors, relative to the current scroll position.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    nodes: Vec<Node>,
    roots: Vec<ElementId>,
    window_height: f64,
    content_height: Option<f64>,
    root_classes: BTreeSet<String>,
    scroll: ScrollHandle,
}

impl InMemoryDocument {
    pub fn new(window_height: f64) -> Self {
        Self::with_scroll(window_height, ScrollHandle::default())
    }

    /// Document scrolled by the engine owning `scroll`
    pub fn with_scroll(window_height: f64, scroll: ScrollHandle) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            window_height,
            content_height: None,
            root_classes: BTreeSet::new(),
            scroll,
        }
    }

    pub fn insert(&mut self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            name: spec.name,
            parent,
            children: Vec::new(),
            classes: spec.classes.into_iter().collect(),
            data: spec.data,
            attrs: spec.attrs,
            top: spec.top,
            height: spec.height,
            outer_height: spec.outer_height.unwrap_or(spec.height),
            transform: None,
            attached: true,
        });

        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Remove an element and its subtree from the document
    pub fn detach(&mut self, element: ElementId) {
        let mut stack = vec![element];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0) {
                node.attached = false;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll.set(scroll_top);
    }

    pub fn set_window_height(&mut self, window_height: f64) {
        self.window_height = window_height;
    }

    /// Fix the content height instead of deriving it from the nodes
    pub fn set_content_height(&mut self, content_height: f64) {
        self.content_height = Some(content_height);
    }

    /// Move an element in the layout (e.g. after content above it changed)
    pub fn set_layout_top(&mut self, element: ElementId, top: f64) -> Result<()> {
        self.node_mut(element)?.top = top;
        Ok(())
    }

    /// Transform style currently set on the element
    pub fn transform(&self, element: ElementId) -> Option<Translate> {
        self.node(element).and_then(|n| n.transform)
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.node(element)
            .map(|n| n.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn name(&self, element: ElementId) -> Option<&str> {
        self.node(element).and_then(|n| n.name.as_deref())
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    /// Attached elements in document order
    pub fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.walk(root, &mut out);
        }
        out
    }

    fn walk(&self, id: ElementId, out: &mut Vec<ElementId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        out.push(id);
        for &child in &node.children {
            self.walk(child, out);
        }
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0).filter(|n| n.attached)
    }

    fn node_mut(&mut self, element: ElementId) -> Result<&mut Node> {
        self.nodes
            .get_mut(element.0)
            .filter(|n| n.attached)
            .ok_or(Error::ElementNotFound(element))
    }

    /// Sum of the Y translations on the element and its ancestors
    fn translated_y(&self, element: ElementId) -> f64 {
        let mut total = 0.0;
        let mut current = Some(element);
        while let Some(node) = current.and_then(|id| self.nodes.get(id.0)) {
            total += node.transform.map(|t| t.y).unwrap_or(0.0);
            current = node.parent;
        }
        total
    }
}

impl Document for InMemoryDocument {
    fn query(&self, selector: &str) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    fn resolve(&self, reference: &str) -> Vec<ElementId> {
        self.query(reference)
    }

    fn descendants(&self, element: ElementId, selector: &str) -> Vec<ElementId> {
        let Some(node) = self.node(element) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for &child in &node.children {
            self.walk(child, &mut out);
        }
        out.retain(|&id| self.matches(id, selector));
        out
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        self.node(element).is_some_and(|n| n.matches(selector))
    }

    fn data(&self, element: ElementId, key: &str) -> Option<String> {
        self.node(element).and_then(|n| n.data.get(key).cloned())
    }

    fn attr(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element).and_then(|n| n.attrs.get(name).cloned())
    }

    fn bounds(&self, element: ElementId) -> Option<Bounds> {
        let node = self.node(element)?;
        Some(Bounds {
            top: node.top + self.translated_y(element) - self.scroll.get(),
            outer_height: node.outer_height,
            height: node.height,
        })
    }

    fn content_height(&self) -> f64 {
        self.content_height.unwrap_or_else(|| {
            self.nodes
                .iter()
                .filter(|n| n.attached)
                .map(|n| n.top + n.outer_height)
                .fold(0.0, f64::max)
        })
    }

    fn window_height(&self) -> f64 {
        self.window_height
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element).is_some_and(|n| n.classes.contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<()> {
        self.node_mut(element)?.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<()> {
        self.node_mut(element)?.classes.remove(class);
        Ok(())
    }

    fn set_transform(&mut self, element: ElementId, translate: Option<Translate>) -> Result<()> {
        self.node_mut(element)?.transform = translate;
        Ok(())
    }

    fn set_root_class(&mut self, class: &str, enabled: bool) {
        if enabled {
            self.root_classes.insert(class.to_string());
        } else {
            self.root_classes.remove(class);
        }
    }
}
