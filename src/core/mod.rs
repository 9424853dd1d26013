pub mod cmd;
pub mod config;
pub mod model;
pub mod msg;
pub mod orchestrator;
pub mod runner;
pub mod service;
pub mod traits;
