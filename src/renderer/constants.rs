//! Shared constants for the HTML renderer (CSS units inline).

// ── Page ────────────────────────────────────────────────────────────
pub(super) const MAX_CONTENT_WIDTH: &str = "1400px";
pub(super) const PRINT_MARGIN_TOP: &str = "1.5cm";
pub(super) const PRINT_MARGIN_BOTTOM: &str = "0.8cm";
pub(super) const PRINT_MARGIN_SIDE: &str = "0.5cm";

// ── Keys ────────────────────────────────────────────────────────────
pub(super) const KEY_WIDTH: &str = "56px";
pub(super) const KEY_HEIGHT: &str = "40px";
pub(super) const GRID_KEY_WIDTH: &str = "48px";
pub(super) const GRID_KEY_HEIGHT: &str = "32px";
pub(super) const KEY_FONT_SIZE: &str = "24px";
pub(super) const PRINT_KEY_FONT_SIZE: &str = "18pt";

// ── Arrow between chords ────────────────────────────────────────────
pub(super) const ARROW: &str = "\u{2192}";

// ── Colors (screen) ─────────────────────────────────────────────────
pub(super) const BACKGROUND: &str = "#121212";
pub(super) const SURFACE: &str = "#1e1e1e";
pub(super) const CHORD_SURFACE: &str = "#2a2a2a";
pub(super) const TEXT_COLOR: &str = "#e0e0e0";
pub(super) const MUTED_COLOR: &str = "#aaaaaa";
pub(super) const ACCENT_COLOR: &str = "#4fc3f7";
pub(super) const LABEL_COLOR: &str = "#81c784";
pub(super) const KEY_SURFACE: &str = "#333333";
pub(super) const KEY_BORDER: &str = "#444444";
pub(super) const ACTIVE_KEY: &str = "#f44336";
pub(super) const ACTIVE_KEY_BORDER: &str = "#d32f2f";

// ── Colors (print) ──────────────────────────────────────────────────
pub(super) const PRINT_ACTIVE_KEY: &str = "#ffe6e6";
pub(super) const PRINT_ACTIVE_BORDER: &str = "#cc0000";
