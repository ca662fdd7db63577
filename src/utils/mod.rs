// src/utils/mod.rs

pub mod aggregate;
pub mod export;
pub mod extract;
pub mod hash;
pub mod jwt;
