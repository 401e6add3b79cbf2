mod context;
mod encoding;
mod reflection;

pub use context::{CONTEXT_WINDOW, Placement, placement};
pub use encoding::{escape_html, escaped_variants};
pub use reflection::{Classification, ReflectionAnalyzer};
