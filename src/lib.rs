// Library for tests to access modules

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod models;
pub mod presentation;
pub mod routes;
pub mod store;
pub mod tasks;
pub mod version;
