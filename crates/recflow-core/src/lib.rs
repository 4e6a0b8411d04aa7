pub mod config;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod logging;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod retry;
