// src/domain/mod.rs

pub mod fare;
pub mod matching;
