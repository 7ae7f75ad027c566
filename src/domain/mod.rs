// Domain layer: case identifiers, request/response models and the lookup port.

pub mod model;
pub mod ports;
