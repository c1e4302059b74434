//! Components that render feed data.

pub mod sensor_table;
pub mod status_line;

pub use sensor_table::*;
pub use status_line::*;
