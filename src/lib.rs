pub mod app;
pub mod auth;
pub mod config;
pub mod diary;
pub mod error;
pub mod extract;
pub mod foods;
pub mod notify;
pub mod nutrition;
pub mod repo;
pub mod state;
