//! Greenhouse controller library.
//!
//! Exposes the control loop, decision engine and adapters for the binary,
//! integration tests and fuzzing.  Nothing here touches real hardware;
//! hardware variants plug in through the traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod decision;
pub mod diagnostics;
pub mod error;
