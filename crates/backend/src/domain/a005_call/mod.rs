pub mod poller;
pub mod service;
pub mod watch;
