//! Client code for shellcache.
//!
//! This crate provides the HTTP implementation of the worker's network
//! boundary and URL resolution shared by the server.

pub mod fetch;

pub use fetch::{FetchConfig, HttpNetwork, UrlError, resolve};
