//! MFA-gated AWS credentials for local tooling.
//!
//! A session minted with `GetSessionToken` is cached on disk and reused until
//! it expires; every run then assumes the configured role with that session
//! and publishes the role credentials to the caller's environment.

pub mod aws;
pub mod broker;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod otp;
pub mod publish;
