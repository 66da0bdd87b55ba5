pub mod errors;
pub mod external;
pub mod order;
pub mod ports;
