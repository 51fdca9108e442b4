pub mod backend;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod query;
pub mod run;
pub mod server;
pub mod tools;

pub use config::Config;
pub use server::ProdSyncServer;
