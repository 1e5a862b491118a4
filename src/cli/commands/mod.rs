pub mod config;
pub mod recode;
pub mod table;
