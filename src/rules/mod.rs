//! Match-level rules.
//!
//! Win conditions are pluggable through `VictoryCondition`; the default is
//! `KeysForged`.

pub mod victory;

pub use victory::{GameResult, KeysForged, VictoryCondition};
