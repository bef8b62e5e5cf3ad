//! Resolution and description-generation core: graph resolver, flattener,
//! template matcher, value resolver, and the description generator the
//! effect parsers are built on.

pub mod context;
pub mod describe;
pub mod flatten;
pub mod matcher;
pub mod resolve;
pub mod value;
