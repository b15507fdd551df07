// Domain layer: booking models and the ports the submission workflow talks through.

pub mod model;
pub mod ports;
