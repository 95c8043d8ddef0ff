//! HTTP handlers

pub mod health;
pub mod home;
pub mod clients;
pub mod plots;
