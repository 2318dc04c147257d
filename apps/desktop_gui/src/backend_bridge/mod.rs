//! Bridge between the UI thread and the backend worker that performs file
//! reads, preview decoding and prediction requests.

pub mod commands;
pub mod runtime;
