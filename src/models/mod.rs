// src/models/mod.rs

pub mod carpool;
pub mod complaint;
pub mod feedback;
pub mod notification;
pub mod role;
pub mod user;
pub mod vehicle;
