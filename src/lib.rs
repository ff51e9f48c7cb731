//! CSV meter-export summation: parse an uploaded export, sum each device
//! column over the data region, and serve back a summary CSV.

pub mod error;
pub mod process;
pub mod server;
pub mod store;
pub mod table;
