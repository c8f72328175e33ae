//! Atelier: region-constrained AI image regeneration on an interactive canvas.
//!
//! The drawing surface itself lives in the `canvas` crate. This crate wires
//! it to the generation backend:
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment-driven settings |
//! | [`net`] | HTTP transport seam and wire types |
//! | [`session`] | Session state machine and credential storage |
//! | [`pipeline`] | Authenticated, balance-aware request path |
//! | [`generation`] | Request and result bodies per endpoint |
//! | [`templates`] | Prompt template catalog |
//! | [`studio`] | Application context tying it all together |
//! | [`error`] | Error taxonomy |

pub mod config;
pub mod error;
pub mod generation;
pub mod net;
pub mod pipeline;
pub mod session;
pub mod studio;
pub mod templates;
