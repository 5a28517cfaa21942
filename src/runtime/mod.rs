//! Application lifecycle and execution modes
//!
//! - `lifetime`: component assembly before a mode starts
//! - `modes`: HTTP server and one-shot CLI lookup

pub mod lifetime;
pub mod modes;
