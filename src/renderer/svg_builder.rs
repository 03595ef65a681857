//! Drawing helpers, thin wrappers that append styled shapes to an
//! [`SvgDocument`] and hand back their node ids.

use crate::svg::{fmt_num, NodeId, SvgDocument};

use super::constants::*;

pub(super) struct SvgBuilder<'a> {
    pub(super) doc: &'a mut SvgDocument,
}

impl<'a> SvgBuilder<'a> {
    pub(super) fn new(doc: &'a mut SvgDocument) -> Self {
        Self { doc }
    }

    pub(super) fn group(&mut self, parent: NodeId, class: &str) -> NodeId {
        let g = self.doc.create_element(parent, "g");
        self.doc.set_attribute(g, "class", class);
        g
    }

    pub(super) fn line(
        &mut self,
        parent: NodeId,
        (x1, y1): (f64, f64),
        (x2, y2): (f64, f64),
        color: &str,
        width: f64,
    ) -> NodeId {
        let l = self.doc.create_element(parent, "line");
        self.doc.set_attribute(l, "x1", fmt_num(x1));
        self.doc.set_attribute(l, "y1", fmt_num(y1));
        self.doc.set_attribute(l, "x2", fmt_num(x2));
        self.doc.set_attribute(l, "y2", fmt_num(y2));
        self.doc.set_attribute(l, "stroke", color);
        self.doc.set_attribute(l, "stroke-width", fmt_num(width));
        l
    }

    pub(super) fn rect(&mut self, parent: NodeId, x: f64, y: f64, w: f64, h: f64, fill: &str) -> NodeId {
        let r = self.doc.create_element(parent, "rect");
        self.doc.set_attribute(r, "x", fmt_num(x));
        self.doc.set_attribute(r, "y", fmt_num(y));
        self.doc.set_attribute(r, "width", fmt_num(w));
        self.doc.set_attribute(r, "height", fmt_num(h));
        self.doc.set_attribute(r, "fill", fill);
        r
    }

    pub(super) fn path(&mut self, parent: NodeId, d: &str, fill: &str, stroke: &str, stroke_width: f64) -> NodeId {
        let p = self.doc.create_element(parent, "path");
        self.doc.set_attribute(p, "d", d);
        self.doc.set_attribute(p, "fill", fill);
        self.doc.set_attribute(p, "stroke", stroke);
        self.doc.set_attribute(p, "stroke-width", fmt_num(stroke_width));
        p
    }

    pub(super) fn text(
        &mut self,
        parent: NodeId,
        (x, y): (f64, f64),
        content: &str,
        size: f64,
        fill: &str,
        anchor: &str,
    ) -> NodeId {
        let t = self.doc.create_element(parent, "text");
        self.doc.set_attribute(t, "x", fmt_num(x));
        self.doc.set_attribute(t, "y", fmt_num(y));
        self.doc.set_attribute(t, "font-size", fmt_num(size));
        self.doc.set_attribute(t, "fill", fill);
        self.doc.set_attribute(t, "text-anchor", anchor);
        self.doc.set_text(t, content);
        t
    }

    /// Notehead as a closed path (four cubic arcs, tilted like an engraved
    /// head). Half and whole notes are hollow.
    pub(super) fn notehead(&mut self, parent: NodeId, cx: f64, cy: f64, filled: bool) -> NodeId {
        let d = ellipse_path(cx, cy, NOTEHEAD_RX, NOTEHEAD_RY);
        let fill = if filled { NOTE_COLOR } else { "none" };
        let p = self.path(parent, &d, fill, NOTE_COLOR, NOTE_STROKE_WIDTH);
        self.doc.set_attribute(p, "class", "notehead");
        p
    }
}

/// Ellipse outline built from cubic Béziers, rotated by -15°.
pub(super) fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> String {
    const K: f64 = 0.5523; // circle-to-cubic handle ratio
    let (s, c) = (-15f64).to_radians().sin_cos();
    let rot = |x: f64, y: f64| (cx + x * c - y * s, cy + x * s + y * c);

    let pts = [
        rot(rx, 0.0),
        rot(rx, K * ry), rot(K * rx, ry), rot(0.0, ry),
        rot(-K * rx, ry), rot(-rx, K * ry), rot(-rx, 0.0),
        rot(-rx, -K * ry), rot(-K * rx, -ry), rot(0.0, -ry),
        rot(K * rx, -ry), rot(rx, -K * ry), rot(rx, 0.0),
    ];
    let p = |i: usize| format!("{},{}", fmt_num(pts[i].0), fmt_num(pts[i].1));
    format!(
        "M{} C{} {} {} C{} {} {} C{} {} {} C{} {} {} Z",
        p(0), p(1), p(2), p(3), p(4), p(5), p(6), p(7), p(8), p(9), p(10), p(11), p(12)
    )
}

/// Small filled disc (augmentation dot).
pub(super) fn dot_path(cx: f64, cy: f64, r: f64) -> String {
    format!(
        "M{},{} a{},{} 0 1,0 {},0 a{},{} 0 1,0 {},0 Z",
        fmt_num(cx - r), fmt_num(cy),
        fmt_num(r), fmt_num(r), fmt_num(2.0 * r),
        fmt_num(r), fmt_num(r), fmt_num(-2.0 * r),
    )
}

/// Axis-aligned rectangle as path data.
pub(super) fn box_path(x: f64, y: f64, w: f64, h: f64) -> String {
    format!(
        "M{},{} h{} v{} h{} Z",
        fmt_num(x), fmt_num(y), fmt_num(w), fmt_num(h), fmt_num(-w)
    )
}
