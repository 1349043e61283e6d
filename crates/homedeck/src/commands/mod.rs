pub mod config_cmd;
pub mod relay;
pub mod serve;
