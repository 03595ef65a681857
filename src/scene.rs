//! A rendered scene: the SVG document, the note groups drawn into it, the
//! time slices that group them, and the per-scope filter chains the effect
//! pipeline reconfigures.

use std::collections::HashMap;

use crate::config::MutationKind;
use crate::error::{Error, Result};
use crate::svg::{NodeId, SvgDocument};

/// Index of a [`NoteGroup`] within its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

/// Whether a group is a sounding note or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// A pitched note; `stem` is the stem sub-element when one was drawn.
    Pitched { stem: Option<NodeId> },
    Rest,
}

/// One rendered note or rest. Owned by the renderer that drew it; effects
/// only touch presentation attributes of its nodes.
#[derive(Debug, Clone)]
pub struct NoteGroup {
    id: String,
    node: NodeId,
    kind: NoteKind,
    pitch: Option<u8>,
    markers: Vec<String>,
}

impl NoteGroup {
    pub(crate) fn new(id: String, node: NodeId, kind: NoteKind) -> Self {
        Self { id, node, kind, pitch: None, markers: Vec::new() }
    }

    pub(crate) fn with_pitch(mut self, pitch: Option<u8>) -> Self {
        self.pitch = pitch;
        self
    }

    pub(crate) fn with_markers(mut self, markers: Vec<String>) -> Self {
        self.markers = markers;
        self
    }

    /// Stable identifier, also the `id` attribute of the root node.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root visual node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn is_rest(&self) -> bool {
        self.kind == NoteKind::Rest
    }

    pub fn stem(&self) -> Option<NodeId> {
        match self.kind {
            NoteKind::Pitched { stem } => stem,
            NoteKind::Rest => None,
        }
    }

    /// MIDI pitch, if the group is a pitched note.
    pub fn pitch(&self) -> Option<u8> {
        self.pitch
    }

    /// Lyric texts attached to the note.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Notes of one voice inside a time slice.
#[derive(Debug, Clone)]
pub struct VoiceEntry {
    pub voice: i32,
    pub groups: Vec<GroupId>,
}

/// Everything sounding at one beat of one staff in one measure.
#[derive(Debug, Clone)]
pub struct StaffEntry {
    pub part: usize,
    pub staff: usize,
    pub measure: usize,
    /// Onset within the measure, in quarter notes
    pub beat: f64,
    pub voice_entries: Vec<VoiceEntry>,
}

impl StaffEntry {
    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.voice_entries.iter().flat_map(|v| v.groups.iter().copied())
    }
}

/// Filter primitives built for one scope, in pipeline order.
#[derive(Debug, Clone)]
pub struct FilterChain {
    pub filter: NodeId,
    pub blur: NodeId,
    pub erode: NodeId,
    pub shadow: NodeId,
    pub turbulence: NodeId,
    pub waves: NodeId,
}

/// Where a scene is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Drawn, no filter scope yet.
    Rendered,
    FiltersInitialized,
    /// At least one effect has been applied.
    Active,
}

/// Deterministic id of a filter stage within a scope.
pub fn stage_id(scope_id: &str, stage: &str) -> String {
    format!("{scope_id}-{stage}")
}

/// Value for a `filter` attribute naming the scope's whole chain.
pub fn filter_reference(scope_id: &str) -> String {
    format!("url(#{})", stage_id(scope_id, "filter"))
}

/// One fully rendered score or note sequence.
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) doc: SvgDocument,
    pub(crate) groups: Vec<NoteGroup>,
    pub(crate) entries: Vec<StaffEntry>,
    pub(crate) scopes: HashMap<String, FilterChain>,
    pub(crate) phase: Phase,
    defs: Option<NodeId>,
}

impl Scene {
    pub fn new(doc: SvgDocument) -> Self {
        Self {
            doc,
            groups: Vec::new(),
            entries: Vec::new(),
            scopes: HashMap::new(),
            phase: Phase::Rendered,
            defs: None,
        }
    }

    pub fn document(&self) -> &SvgDocument {
        &self.doc
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn add_group(&mut self, group: NoteGroup) -> GroupId {
        self.groups.push(group);
        GroupId(self.groups.len() - 1)
    }

    pub(crate) fn add_staff_entry(&mut self, entry: StaffEntry) {
        self.entries.push(entry);
    }

    pub fn note_groups(&self) -> &[NoteGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&NoteGroup> {
        self.groups.get(id.0)
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        (0..self.groups.len()).map(GroupId).collect()
    }

    /// Find a group by its stable identifier.
    pub fn find_group(&self, id: &str) -> Option<GroupId> {
        self.groups.iter().position(|g| g.id == id).map(GroupId)
    }

    pub fn staff_entries(&self) -> &[StaffEntry] {
        &self.entries
    }

    /// Groups tagged with the given mutation kind's marker.
    pub fn groups_marked(&self, kind: MutationKind) -> Vec<GroupId> {
        let code = kind.code();
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.markers.iter().any(|m| m == code))
            .map(|(i, _)| GroupId(i))
            .collect()
    }

    /// Groups whose root node carries `data-{key}="{value}"`.
    pub fn groups_with_data(&self, key: &str, value: &str) -> Vec<GroupId> {
        let attr = format!("data-{key}");
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| self.doc.attribute(g.node, &attr) == Some(value))
            .map(|(i, _)| GroupId(i))
            .collect()
    }

    pub fn filter_chain(&self, scope_id: &str) -> Option<&FilterChain> {
        self.scopes.get(scope_id)
    }

    /// Look up a filter stage node by its full sub-id, e.g. `"s1-blur"`.
    pub fn filter_node(&self, sub_id: &str) -> Option<NodeId> {
        self.doc.element_by_id(sub_id)
    }

    /// Build the filter pipeline for `scope_id`: blur → erode → drop-shadow →
    /// turbulence + displacement, every stage neutral until an effect
    /// configures it.
    pub fn init_scope(&mut self, scope_id: &str) -> Result<()> {
        if self.scopes.contains_key(scope_id) {
            return Err(Error::AlreadyInitialized(scope_id.to_string()));
        }

        let defs = match self.defs {
            Some(d) => d,
            None => {
                let root = self.doc.root();
                let d = self.doc.create_element(root, "defs");
                self.defs = Some(d);
                d
            }
        };

        let doc = &mut self.doc;
        let id = |stage: &str| stage_id(scope_id, stage);

        let filter = doc.create_element(defs, "filter");
        doc.set_attribute(filter, "id", id("filter"));
        doc.set_attribute(filter, "x", "-50%");
        doc.set_attribute(filter, "y", "-50%");
        doc.set_attribute(filter, "width", "200%");
        doc.set_attribute(filter, "height", "200%");

        let blur = doc.create_element(filter, "feGaussianBlur");
        doc.set_attribute(blur, "id", id("blur"));
        doc.set_attribute(blur, "in", "SourceGraphic");
        doc.set_attribute(blur, "stdDeviation", "0");
        doc.set_attribute(blur, "result", id("blur"));

        let erode = doc.create_element(filter, "feMorphology");
        doc.set_attribute(erode, "id", id("erode"));
        doc.set_attribute(erode, "in", id("blur"));
        doc.set_attribute(erode, "operator", "erode");
        doc.set_attribute(erode, "radius", "0 0");
        doc.set_attribute(erode, "result", id("erode"));

        let shadow = doc.create_element(filter, "feDropShadow");
        doc.set_attribute(shadow, "id", id("shadow"));
        doc.set_attribute(shadow, "in", id("erode"));
        doc.set_attribute(shadow, "dx", "0");
        doc.set_attribute(shadow, "dy", "0");
        doc.set_attribute(shadow, "stdDeviation", "0");
        doc.set_attribute(shadow, "flood-color", "black");
        doc.set_attribute(shadow, "result", id("shadow"));

        let turbulence = doc.create_element(filter, "feTurbulence");
        doc.set_attribute(turbulence, "id", id("turbulence"));
        doc.set_attribute(turbulence, "type", "turbulence");
        doc.set_attribute(turbulence, "baseFrequency", "0.05");
        doc.set_attribute(turbulence, "numOctaves", "2");
        doc.set_attribute(turbulence, "result", id("turbulence"));

        let waves = doc.create_element(filter, "feDisplacementMap");
        doc.set_attribute(waves, "id", id("waves"));
        doc.set_attribute(waves, "in", id("shadow"));
        doc.set_attribute(waves, "in2", id("turbulence"));
        doc.set_attribute(waves, "scale", "0");
        doc.set_attribute(waves, "xChannelSelector", "R");
        doc.set_attribute(waves, "yChannelSelector", "G");
        doc.set_attribute(waves, "result", id("waves"));

        self.scopes.insert(
            scope_id.to_string(),
            FilterChain { filter, blur, erode, shadow, turbulence, waves },
        );
        if self.phase == Phase::Rendered {
            self.phase = Phase::FiltersInitialized;
        }
        log::debug!("initialized filter scope '{}'", scope_id);
        Ok(())
    }

    /// Discard every filter node, note group and mutation.
    pub fn teardown(&mut self) {
        let root = self.doc.root();
        self.doc.clear_children(root);
        self.groups.clear();
        self.entries.clear();
        self.scopes.clear();
        self.defs = None;
        self.phase = Phase::Rendered;
    }

    pub fn to_svg_string(&self) -> String {
        self.doc.to_svg_string()
    }
}
