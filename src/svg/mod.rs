//! In-memory SVG document: a small DOM-like tree that the renderers draw
//! into and the effect pipeline mutates.
//!
//! Elements live in an arena and are addressed by [`NodeId`]. Attributes
//! keep their insertion order so the serialized output stays stable and
//! readable. Removed subtrees stay in the arena but become unreachable.

mod bbox;
mod writer;

use std::collections::HashMap;

pub use bbox::BBox;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Handle to one element of an [`SvgDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            style: Vec::new(),
            text: None,
            children: Vec::new(),
            parent,
        }
    }
}

/// A mutable SVG tree rooted at a single `<svg>` element.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<Element>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
}

impl SvgDocument {
    /// Create a document whose root is `<svg>` with the given size.
    pub fn new(width: f64, height: f64) -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("svg", None)],
            root: NodeId(0),
            ids: HashMap::new(),
        };
        let root = doc.root;
        doc.set_attribute(root, "xmlns", SVG_NS);
        doc.resize(root, width, height);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Set `width`, `height` and `viewBox` on an element.
    pub fn resize(&mut self, id: NodeId, width: f64, height: f64) {
        self.set_attribute(id, "viewBox", format!("0 0 {} {}", fmt_num(width), fmt_num(height)));
        self.set_attribute(id, "width", fmt_num(width));
        self.set_attribute(id, "height", fmt_num(height));
    }

    /// Append a new element with `tag` as the last child of `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set (or overwrite) an attribute. Setting `id` also registers the
    /// element for [`SvgDocument::element_by_id`].
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "id" {
            if let Some(old) = self.attribute(id, "id").map(String::from) {
                self.ids.remove(&old);
            }
            self.ids.insert(value.clone(), id);
        }
        let attrs = &mut self.nodes[id.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if name == "id" {
            if let Some(old) = self.attribute(id, "id").map(String::from) {
                self.ids.remove(&old);
            }
        }
        self.nodes[id.0].attrs.retain(|(k, _)| k != name);
    }

    /// All attributes of an element, in insertion order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.nodes[id.0]
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .style
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let style = &mut self.nodes[id.0].style;
        match style.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => style.push((name.to_string(), value)),
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = Some(text.into());
    }

    /// Look up an element by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Every element below `id` in document order (not including `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Descendants of `id` with the given tag, like `getElementsByTagName`.
    pub fn elements_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.tag(n) == tag)
            .collect()
    }

    /// Detach every child of `id`. Ids declared inside the removed subtrees
    /// are unregistered.
    pub fn clear_children(&mut self, id: NodeId) {
        for gone in self.descendants(id) {
            if let Some(name) = self.attribute(gone, "id").map(String::from) {
                self.ids.remove(&name);
            }
            self.nodes[gone.0].parent = None;
        }
        self.nodes[id.0].children.clear();
    }

    /// Number of elements reachable from the root, root included.
    pub fn element_count(&self) -> usize {
        self.descendants(self.root).len() + 1
    }

    /// Geometric bounds of an element and its children, in user units.
    /// Transforms are not applied. Returns `None` for elements with no
    /// measurable geometry (e.g. text, empty groups).
    pub fn bbox(&self, id: NodeId) -> Option<BBox> {
        let own = bbox::element_bounds(self, id);
        self.children(id)
            .iter()
            .filter_map(|&c| self.bbox(c))
            .fold(own, |acc, b| match acc {
                Some(a) => Some(a.union(&b)),
                None => Some(b),
            })
    }

    /// Serialize the whole document.
    pub fn to_svg_string(&self) -> String {
        writer::write_document(self)
    }
}

/// Format a number for an attribute value: integers without a fraction,
/// everything else with at most two decimals.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
