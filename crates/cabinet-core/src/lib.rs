//! Client-side session core for the learning cabinet (config, token storage,
//! auth API client, session and sub-flow state machines).

pub mod api;
pub mod config;
pub mod flows;
pub mod google;
pub mod jwt;
pub mod logging;
pub mod session;
pub mod store;
