pub mod config_manager;
pub mod constants;
pub mod naming;
pub mod registry;
