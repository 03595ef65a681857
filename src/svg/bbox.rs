//! Bounding boxes for the basic SVG shapes.

use super::{NodeId, SvgDocument};

/// Axis-aligned rectangle in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut x0, mut y0) = *first;
        let (mut x1, mut y1) = *first;
        for &(x, y) in rest {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Self { x: x0, y: y0, width: x1 - x0, height: y1 - y0 })
    }

    pub fn union(&self, other: &BBox) -> BBox {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        BBox { x: x0, y: y0, width: x1 - x0, height: y1 - y0 }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

fn num_attr(doc: &SvgDocument, id: NodeId, name: &str) -> f64 {
    doc.attribute(id, name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Bounds of the element's own geometry, ignoring children.
pub(super) fn element_bounds(doc: &SvgDocument, id: NodeId) -> Option<BBox> {
    let n = |name: &str| num_attr(doc, id, name);
    match doc.tag(id) {
        "rect" => Some(BBox { x: n("x"), y: n("y"), width: n("width"), height: n("height") }),
        "circle" => {
            let r = n("r");
            Some(BBox { x: n("cx") - r, y: n("cy") - r, width: 2.0 * r, height: 2.0 * r })
        }
        "ellipse" => {
            let (rx, ry) = (n("rx"), n("ry"));
            Some(BBox { x: n("cx") - rx, y: n("cy") - ry, width: 2.0 * rx, height: 2.0 * ry })
        }
        "line" => BBox::from_points(&[(n("x1"), n("y1")), (n("x2"), n("y2"))]),
        "path" => doc.attribute(id, "d").and_then(|d| BBox::from_points(&path_points(d))),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Path data
// ═══════════════════════════════════════════════════════════════════════

enum Token {
    Cmd(char),
    Num(f64),
}

fn tokenize(d: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = d.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Cmd(c));
            i += 1;
        } else if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            let start = i;
            let mut seen_dot = c == '.';
            i += 1;
            while i < chars.len() {
                let ch = chars[i];
                if ch.is_ascii_digit() {
                    i += 1;
                } else if ch == '.' && !seen_dot {
                    seen_dot = true;
                    i += 1;
                } else if (ch == 'e' || ch == 'E') && i + 1 < chars.len() {
                    i += 1;
                    if chars[i] == '-' || chars[i] == '+' {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let s: String = chars[start..i].iter().collect();
            if let Ok(v) = s.parse::<f64>() {
                tokens.push(Token::Num(v));
            }
        } else {
            i += 1;
        }
    }
    tokens
}

/// Every end point and control point a path visits, in absolute
/// coordinates. Arc commands contribute their end point only.
pub(super) fn path_points(d: &str) -> Vec<(f64, f64)> {
    let tokens = tokenize(d);
    let mut points = Vec::new();
    let (mut cx, mut cy) = (0.0, 0.0);
    let (mut sx, mut sy) = (0.0, 0.0);
    let mut cmd = 'M';
    let mut i = 0;

    let take = |i: &mut usize, n: usize| -> Option<Vec<f64>> {
        let mut vals = Vec::with_capacity(n);
        for _ in 0..n {
            match tokens.get(*i) {
                Some(Token::Num(v)) => {
                    vals.push(*v);
                    *i += 1;
                }
                _ => return None,
            }
        }
        Some(vals)
    };

    while i < tokens.len() {
        if let Token::Cmd(c) = tokens[i] {
            cmd = c;
            i += 1;
            if c == 'Z' || c == 'z' {
                cx = sx;
                cy = sy;
                continue;
            }
        }
        let rel = cmd.is_ascii_lowercase();
        let (ox, oy) = if rel { (cx, cy) } else { (0.0, 0.0) };
        match cmd.to_ascii_uppercase() {
            'M' | 'L' | 'T' => {
                let Some(v) = take(&mut i, 2) else { break };
                cx = ox + v[0];
                cy = oy + v[1];
                points.push((cx, cy));
                if cmd == 'M' || cmd == 'm' {
                    sx = cx;
                    sy = cy;
                    // implicit lineto after the first pair
                    cmd = if rel { 'l' } else { 'L' };
                }
            }
            'H' => {
                let Some(v) = take(&mut i, 1) else { break };
                cx = if rel { cx + v[0] } else { v[0] };
                points.push((cx, cy));
            }
            'V' => {
                let Some(v) = take(&mut i, 1) else { break };
                cy = if rel { cy + v[0] } else { v[0] };
                points.push((cx, cy));
            }
            'C' => {
                let Some(v) = take(&mut i, 6) else { break };
                points.push((ox + v[0], oy + v[1]));
                points.push((ox + v[2], oy + v[3]));
                cx = ox + v[4];
                cy = oy + v[5];
                points.push((cx, cy));
            }
            'S' | 'Q' => {
                let Some(v) = take(&mut i, 4) else { break };
                points.push((ox + v[0], oy + v[1]));
                cx = ox + v[2];
                cy = oy + v[3];
                points.push((cx, cy));
            }
            'A' => {
                let Some(v) = take(&mut i, 7) else { break };
                cx = ox + v[5];
                cy = oy + v[6];
                points.push((cx, cy));
            }
            _ => i += 1,
        }
    }

    points
}
