//! Chat turn processing: prompt assembly, reply cleaning and the session
//! object that owns the conversation buffer.

pub mod cleaner;
pub mod prompt;
pub mod session;
