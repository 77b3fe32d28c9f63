// Resume analysis: validation, PDF extraction, AI analysis and persistence.
// The pipeline only talks to collaborators through the traits in `ports`.

pub mod extractor;
pub mod handlers;
pub mod ports;
pub mod prompts;
pub mod request;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
