pub mod config;
pub mod logging;

pub mod chat;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod observer;
pub mod pipeline;
pub mod storage;
pub mod synthesize;
pub mod template;
pub mod title;
