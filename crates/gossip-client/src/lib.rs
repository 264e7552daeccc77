//! Client-side OAuth session core for the gossip forum.
//!
//! Embeds as a library: the host view layer constructs an
//! [`auth::AuthController`], feeds it [`auth::AuthEvent`]s, and renders from
//! the read-only [`session::Session`] projection the controller publishes.

pub mod auth;
pub mod config;
pub mod session;
