pub mod config;
pub mod items;
pub mod lists;
pub mod serve;
pub mod watch;
