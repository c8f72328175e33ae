//! Composition engine for region-constrained image regeneration.
//!
//! This crate owns the interactive drawing surface: translating pointer and
//! keyboard events into scene mutations, maintaining the pan/zoom camera,
//! hit-testing objects, tracking the single generation frame, and
//! rasterizing the scene so a region can be exported. It performs no I/O;
//! the host layer wires input events in and reacts to the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level event entry point ([`engine::Engine`]) |
//! | [`doc`] | Scene graph and scene object types |
//! | [`camera`] | Points, rectangles, and the pan/zoom transform |
//! | [`viewport`] | Surface size, zoom-to-point, and pan gestures |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`tools`] | Per-tool pointer handlers |
//! | [`hit`] | Hit-testing against scene objects |
//! | [`frame`] | Generation frame tracking, capture, and result placement |
//! | [`render`] | Software rasterizer |
//! | [`error`] | Capture and render errors |
//! | [`consts`] | Shared numeric constants (zoom limits, default sizes, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod frame;
pub mod hit;
pub mod input;
pub mod render;
pub mod tools;
pub mod viewport;
