//! Constants used throughout the treedelta library.
//!
//! This module provides central definitions for reserved root names and the
//! transformation priorities of each delta family.

/// Default name of the main document root.
pub const MAIN_ROOT: &str = "main";

/// Reserved root name for the graveyard that holds removed nodes.
pub const GRAVEYARD: &str = "$graveyard";

/// Priority of plain content deltas (insert, remove, move, attribute, rename).
pub const CONTENT_PRIORITY: u8 = 0;

/// Priority of the wrap/unwrap pair.
pub const WRAP_PRIORITY: u8 = 1;

/// Priority of the split/merge pair. Must stay above every other family.
pub const SPLIT_PRIORITY: u8 = 2;
