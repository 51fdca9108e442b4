mod prodsync_server;

pub use prodsync_server::ProdSyncServer;
