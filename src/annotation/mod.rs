pub mod builder;
pub mod io;

pub use builder::ReferenceBuilder;
pub use io::{AnnotationReader, AnnotationRecord, ParseError};
