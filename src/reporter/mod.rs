mod console;
mod export;
mod sync;

pub use console::{ConsoleReporter, ParameterTally};
pub use export::{CsvExporter, JsonExporter, TextExporter};
pub use sync::RcloneSync;
