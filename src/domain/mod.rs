// Domain layer: travel modes, chat messages and the ports the chain depends on.

pub mod model;
pub mod ports;
