//! Shared constants for the score renderer (all in SVG user units).

// ── Page & margins ──────────────────────────────────────────────────
pub const DEFAULT_PAGE_WIDTH: f64 = 820.0;
pub(super) const PAGE_MARGIN_LEFT: f64 = 50.0;
pub(super) const PAGE_MARGIN_RIGHT: f64 = 30.0;
pub(super) const PAGE_MARGIN_TOP: f64 = 30.0;
pub(super) const PAGE_MARGIN_BOTTOM: f64 = 40.0;

// ── Staff dimensions ────────────────────────────────────────────────
pub(super) const STAFF_LINE_SPACING: f64 = 10.0; // distance between staff lines
pub(super) const STAFF_HEIGHT: f64 = 40.0; // 5 lines, 4 spaces
pub(super) const SYSTEM_SPACING: f64 = 90.0; // vertical space between systems
pub(super) const GRAND_STAFF_GAP: f64 = 60.0; // between staves of one part
pub(super) const PART_GAP: f64 = 80.0; // between different parts

// ── Header ──────────────────────────────────────────────────────────
pub(super) const HEADER_HEIGHT: f64 = 70.0; // space for title + composer
pub(super) const FIRST_SYSTEM_TOP: f64 = PAGE_MARGIN_TOP + HEADER_HEIGHT;

// ── Prefix widths ───────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 32.0;
pub(super) const TIME_SIG_SPACE: f64 = 24.0;

// ── Note dimensions ─────────────────────────────────────────────────
pub(super) const NOTEHEAD_RX: f64 = 5.5;
pub(super) const NOTEHEAD_RY: f64 = 4.0;
pub(super) const STEM_LENGTH: f64 = 30.0;
pub(super) const STEM_WIDTH: f64 = 1.2;
pub(super) const NOTE_STROKE_WIDTH: f64 = 1.0;
pub(super) const BARLINE_WIDTH: f64 = 1.0;
pub(super) const STAFF_LINE_WIDTH: f64 = 0.8;
pub(super) const LEDGER_LINE_WIDTH: f64 = 0.8;
pub(super) const LEDGER_LINE_EXTEND: f64 = 5.0;
pub(super) const LYRIC_OFFSET_Y: f64 = 22.0; // below the bottom staff line

// ── Measure packing ─────────────────────────────────────────────────
pub(super) const MIN_MEASURE_WIDTH: f64 = 60.0;
pub(super) const PER_ONSET_WIDTH: f64 = 34.0;
pub(super) const MEASURE_PADDING: f64 = 14.0;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const NOTE_COLOR: &str = "#1a1a1a";
pub(super) const STAFF_COLOR: &str = "#555555";
pub(super) const BARLINE_COLOR: &str = "#333333";
pub(super) const HEADER_COLOR: &str = "#1a1a1a";
pub(super) const REST_COLOR: &str = "#1a1a1a";
pub(super) const LYRIC_COLOR: &str = "#4a4a9a";
