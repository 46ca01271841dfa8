// Domain layer: core models and ports (interfaces). No I/O beyond the default `merge_file`.

pub mod model;
pub mod ports;
