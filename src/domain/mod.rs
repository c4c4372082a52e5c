// Domain layer: page/backend ports, the requirement model and summary rendering.

pub mod model;
pub mod ports;
pub mod summary;
