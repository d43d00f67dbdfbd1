pub mod access;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod expression;
pub mod network;
pub mod odata;
pub mod service;
pub mod storage;
