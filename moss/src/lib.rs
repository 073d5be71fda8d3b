//! Terminal front-end of moss: tree display and the interactive loop.

pub mod display;
pub mod error;
pub mod repl;
