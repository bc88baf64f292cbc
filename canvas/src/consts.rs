//! Shared numeric constants for the canvas crate.

// ── Text ────────────────────────────────────────────────────────

/// Font size in world units used when a text element omits `font_size`.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

// ── Clipboard ───────────────────────────────────────────────────

/// Offset in world units applied to both axes when pasting or duplicating,
/// so copies do not sit exactly on top of their source.
pub const DEFAULT_PASTE_OFFSET: f64 = 12.0;

// ── Ids ─────────────────────────────────────────────────────────

/// Prefix used by `SequenceIds` when none is given.
pub const DEFAULT_SEQUENCE_PREFIX: &str = "el";

/// Draws per element before the duplicator gives up on an id source that
/// only returns ids already in use.
pub const MAX_ID_DRAWS: u32 = 64;
