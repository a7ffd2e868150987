#![doc = include_str!("../README.md")]

pub mod auth;

#[cfg(not(target_arch = "wasm32"))]
pub mod blocking;

pub mod logger;

#[cfg(test)]
pub mod test_support;
