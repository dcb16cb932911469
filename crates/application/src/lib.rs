//! Application layer - Command dispatch, the gateway worker, and the
//! receipt composer

pub mod composer;
pub mod dispatch;
pub mod gateway;
pub mod worker;

pub use dispatch::GatewayCommand;
pub use gateway::PosGateway;
pub use worker::{CommandJob, GatewayWorker, SettleConfig};
