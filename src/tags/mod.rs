//! Tag reading and translation

pub mod source;
pub mod translate;

pub use source::read_source;
pub use translate::translate;
