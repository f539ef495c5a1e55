pub mod cells;
pub mod domain;
pub mod packing;
pub mod spatial;
