mod backend;
mod host_locales;
mod output_tracker;

pub use backend::{BackendEvent, InMemoryBackend, InMemoryBackendBuilder, Operation};
pub use host_locales::FixedHostLocales;
pub use output_tracker::OutputTracker;
