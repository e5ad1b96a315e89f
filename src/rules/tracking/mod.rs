//! Tracking narration grammars (`TrackSummary` / `TrackDetail` text).

pub mod helpers;
pub mod rules;
