pub mod external;
pub mod pressure;
pub mod scanner;
pub mod store;
