pub mod constants;
pub mod error;
pub mod protocol;
pub mod aircraft;
pub mod fuel;
pub mod store;
pub mod history;
pub mod net;
pub mod status;
pub mod config;
