// src/handlers/mod.rs

pub mod auth;
pub mod complaint;
pub mod fare;
pub mod feedback;
pub mod matching;
pub mod notification;
pub mod offer;
pub mod profile;
pub mod request;
pub mod role;
pub mod vehicle;
