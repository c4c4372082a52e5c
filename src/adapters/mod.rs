// Adapters layer: concrete implementations of the domain ports (http backend, headless pages, storage).

pub mod headless;
pub mod http;
pub mod storage;
