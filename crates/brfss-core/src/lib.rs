pub mod config;
pub mod logging;

pub mod artifacts;
pub mod catalog;
pub mod extract;
pub mod pipeline;
pub mod storage;
pub mod transfer;
pub mod url_model;
