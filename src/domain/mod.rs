// Domain layer: records, forecast output and the ports the engine reads through.

pub mod model;
pub mod ports;
