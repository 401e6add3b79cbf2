mod client;
mod inject;

pub use client::{Requester, RequesterConfig, USER_AGENT, is_retryable};
pub use inject::{inject_query_param, validate_url};
