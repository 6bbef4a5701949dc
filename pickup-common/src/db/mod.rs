//! Farmer Store: schema, models and queries

pub mod farmers;
pub mod init;
pub mod models;

pub use init::{init_database, init_memory_database};
pub use models::{AssignmentUpdate, ClusterStat, Farmer, NewFarmer, TruckStat};
