//! The per-note effect pipeline.
//!
//! Every effect is a pure mapping from a parameter to attribute writes on a
//! note group's nodes. Non-filter effects write straight onto the group;
//! filter-backed effects reconfigure one stage of a scope's shared filter
//! chain and point the group's `filter` attribute at that chain. Applying
//! the same effect twice leaves the same attributes as applying it once.

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Error, Result};
use crate::scene::{filter_reference, FilterChain, GroupId, NoteGroup, NoteKind, Phase, Scene};
use crate::svg::{fmt_num, SvgDocument};

/// Names of the effects in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum EffectKind {
    Recolor,
    Opacity,
    StrokeWidth,
    Rotate,
    Blur,
    Erode,
    DropShadow,
    #[strum(to_string = "waves", serialize = "displacement")]
    Waves,
}

impl EffectKind {
    /// Whether the effect works through a scope's filter chain.
    pub fn is_filter_backed(&self) -> bool {
        matches!(
            self,
            EffectKind::Blur | EffectKind::Erode | EffectKind::DropShadow | EffectKind::Waves
        )
    }
}

/// An effect together with its parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stroke and fill color of every path in the glyph.
    Recolor(String),
    /// Opacity of the whole group, in [0, 1].
    Opacity(f64),
    StrokeWidth(f64),
    /// Rotation in degrees around the glyph's center.
    Rotate(f64),
    /// Gaussian blur standard deviation.
    Blur(f64),
    /// Erosion radius, applied on both axes.
    Erode(f64),
    DropShadow { dx: f64, dy: f64, color: Option<String> },
    /// Displacement-map scale.
    Waves(f64),
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Recolor(_) => EffectKind::Recolor,
            Effect::Opacity(_) => EffectKind::Opacity,
            Effect::StrokeWidth(_) => EffectKind::StrokeWidth,
            Effect::Rotate(_) => EffectKind::Rotate,
            Effect::Blur(_) => EffectKind::Blur,
            Effect::Erode(_) => EffectKind::Erode,
            Effect::DropShadow { .. } => EffectKind::DropShadow,
            Effect::Waves(_) => EffectKind::Waves,
        }
    }

    pub fn is_filter_backed(&self) -> bool {
        self.kind().is_filter_backed()
    }

    /// Build an effect from a raw parameter string. Values that do not make
    /// sense fall back to the effect's visually-null setting.
    pub fn parse(kind: EffectKind, raw: &str) -> Effect {
        let raw = raw.trim();
        match kind {
            EffectKind::Recolor => Effect::Recolor(raw.to_string()),
            EffectKind::Opacity => Effect::Opacity(match number(kind, raw, 1.0) {
                v if v.is_finite() => v.clamp(0.0, 1.0),
                _ => 1.0,
            }),
            EffectKind::StrokeWidth => Effect::StrokeWidth(non_negative(kind, raw)),
            EffectKind::Rotate => Effect::Rotate(number(kind, raw, 0.0)),
            EffectKind::Blur => Effect::Blur(non_negative(kind, raw)),
            EffectKind::Erode => Effect::Erode(non_negative(kind, raw)),
            EffectKind::Waves => Effect::Waves(non_negative(kind, raw)),
            EffectKind::DropShadow => {
                let parts: Vec<&str> = raw
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .collect();
                let dx = parts.first().map_or(0.0, |s| number(kind, s, 0.0));
                let dy = parts.get(1).map_or(dx, |s| number(kind, s, 0.0));
                let color = parts.get(2).map(|s| s.to_string());
                Effect::DropShadow { dx, dy, color }
            }
        }
    }
}

fn number(kind: EffectKind, raw: &str, null: f64) -> f64 {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            log::warn!("{}: malformed parameter {:?}, using {}", kind, raw, null);
            null
        }
    }
}

fn non_negative(kind: EffectKind, raw: &str) -> f64 {
    number(kind, raw, 0.0).max(0.0)
}

// ═══════════════════════════════════════════════════════════════════════
// Application
// ═══════════════════════════════════════════════════════════════════════

/// Apply `effect` to every target group. Filter-backed effects need
/// `scope_id` to have been initialized with [`Scene::init_scope`]; the
/// check happens before anything is written.
pub fn apply(scene: &mut Scene, effect: &Effect, scope_id: &str, targets: &[GroupId]) -> Result<()> {
    let chain = if effect.is_filter_backed() {
        let chain = scene
            .scopes
            .get(scope_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(scope_id.to_string()))?;
        configure_stage(&mut scene.doc, &chain, effect);
        Some(chain)
    } else {
        None
    };

    let reference = chain.as_ref().map(|_| filter_reference(scope_id));
    for id in targets {
        let Some(group) = scene.groups.get(id.0) else { continue };
        match reference {
            Some(ref r) => scene.doc.set_attribute(group.node(), "filter", r.as_str()),
            None => mutate_group(&mut scene.doc, group, effect),
        }
    }

    log::debug!("applied {:?} to {} groups (scope '{}')", effect, targets.len(), scope_id);
    scene.phase = Phase::Active;
    Ok(())
}

/// Write a filter-backed effect's parameter onto the scope's shared stage.
fn configure_stage(doc: &mut SvgDocument, chain: &FilterChain, effect: &Effect) {
    match effect {
        Effect::Blur(dev) => doc.set_attribute(chain.blur, "stdDeviation", fmt_num(*dev)),
        Effect::Erode(r) => {
            doc.set_attribute(chain.erode, "radius", format!("{} {}", fmt_num(*r), fmt_num(*r)))
        }
        Effect::DropShadow { dx, dy, color } => {
            doc.set_attribute(chain.shadow, "dx", fmt_num(*dx));
            doc.set_attribute(chain.shadow, "dy", fmt_num(*dy));
            if let Some(c) = color {
                doc.set_attribute(chain.shadow, "flood-color", c.as_str());
            }
        }
        Effect::Waves(scale) => doc.set_attribute(chain.waves, "scale", fmt_num(*scale)),
        _ => {}
    }
}

/// Write a non-filter effect onto one group.
fn mutate_group(doc: &mut SvgDocument, group: &NoteGroup, effect: &Effect) {
    match effect {
        Effect::Recolor(color) => {
            if color.is_empty() {
                return;
            }
            for path in doc.elements_by_tag(group.node(), "path") {
                doc.set_attribute(path, "stroke", color.as_str());
                doc.set_attribute(path, "fill", color.as_str());
            }
        }
        Effect::Opacity(alpha) => doc.set_attribute(group.node(), "opacity", fmt_num(*alpha)),
        Effect::StrokeWidth(w) => {
            for path in doc.elements_by_tag(group.node(), "path") {
                doc.set_attribute(path, "stroke-width", fmt_num(*w));
            }
        }
        Effect::Rotate(angle) => {
            let (cx, cy) = doc.bbox(group.node()).map_or((0.0, 0.0), |b| b.center());
            let target = match group.kind() {
                NoteKind::Pitched { stem: Some(stem) } => stem,
                _ => group.node(),
            };
            doc.set_attribute(
                target,
                "transform",
                format!("rotate({} {} {})", fmt_num(*angle), fmt_num(cx), fmt_num(cy)),
            );
        }
        _ => {}
    }
}

impl Scene {
    /// Apply an effect to the given groups.
    pub fn apply(&mut self, effect: &Effect, scope_id: &str, targets: &[GroupId]) -> Result<()> {
        apply(self, effect, scope_id, targets)
    }

    /// Look the effect up by name and parse its parameter, then apply it.
    pub fn apply_named(
        &mut self,
        name: &str,
        parameter: &str,
        scope_id: &str,
        targets: &[GroupId],
    ) -> Result<()> {
        let kind = EffectKind::from_str(name.trim())
            .map_err(|_| Error::UnknownEffect(name.to_string()))?;
        apply(self, &Effect::parse(kind, parameter), scope_id, targets)
    }

    /// Apply an effect to every group of one time slice.
    pub fn apply_to_entry(&mut self, effect: &Effect, scope_id: &str, entry: usize) -> Result<()> {
        let targets: Vec<GroupId> = self
            .entries
            .get(entry)
            .map(|e| e.groups().collect())
            .unwrap_or_default();
        apply(self, effect, scope_id, &targets)
    }
}
