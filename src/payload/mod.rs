mod corpus;
mod loader;

pub use corpus::PayloadCorpus;
pub use loader::{PayloadSource, load_payload_file, parse_payloads};
