// Domain layer: models, the planet-symbol lookup, signal rules and ports.
// Nothing here performs I/O.

pub mod board;
pub mod mapping;
pub mod model;
pub mod ports;
pub mod signal;
pub mod symbols;
