//! Rule tables for the free-text grammars.

pub mod constraints;
pub mod tracking;
