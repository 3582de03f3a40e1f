//! Core pipeline for mirroring an S3-compatible bucket prefix to a local
//! directory tree: paginated lister -> ordered work queue -> worker pipeline
//! -> object client -> sink, with a progress observer sampling shared
//! counters and an orchestrator owning the whole lifecycle.

pub mod client;
pub mod config;
pub mod counters;
pub mod error;
pub mod lister;
pub mod logging;
pub mod object;
pub mod orchestrator;
pub mod progress;
pub mod queue;
pub mod sink;
pub mod uri;
pub mod worker;

pub use client::ObjectClient;
pub use config::Config;
pub use counters::Counters;
pub use error::S3pdError;
pub use object::{ListPage, ObjectRef};
pub use orchestrator::run;
