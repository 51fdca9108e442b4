mod debug_log;

pub use debug_log::DebugLog;
