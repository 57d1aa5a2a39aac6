pub mod model;
pub mod notation;
pub mod ports;
