pub mod about;
pub mod config;
pub mod run;
pub mod stats;
