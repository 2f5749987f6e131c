pub mod magic;
pub mod movegen;
pub mod perft;
pub mod tables;
pub mod types;
