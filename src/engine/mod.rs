//! Core engine — per-symbol analysis and the scan orchestrator.

pub mod analyzer;
pub mod scanner;
