// Thin collaborator implementations used by the runner binary.

pub mod http_probe;
pub mod json_sink;
pub mod memory;

pub use http_probe::HttpPhotoProbe;
pub use json_sink::JsonFileSink;
pub use memory::InMemoryReverification;
