//! Generation engine abstractions for Parley.
//!
//! - `TextGenerator`: RPITIT trait for concrete engine implementations
//! - `BoxTextGenerator`: object-safe wrapper for runtime backend selection
//! - `ScriptedGenerator`: canned replies for tests (`testing` feature)

pub mod box_generator;
pub mod generator;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
