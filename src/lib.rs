pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
pub mod validator;
