pub mod diagnostics;
pub mod messages;

pub use diagnostics::{DiagnosticSink, TracingSink};
pub use messages::Event;
