pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod services;
pub mod web;
