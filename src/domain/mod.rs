// Domain layer: core models and ports (interfaces). No dependencies on the
// pipeline or adapters.

pub mod model;
pub mod ports;
