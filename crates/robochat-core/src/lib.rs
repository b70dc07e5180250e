//! Core types and error definitions for the robochat client.
//!
//! This crate provides the foundational types shared across all robochat
//! crates: the error taxonomy, the service status scheme, the JSON wire
//! bodies, the typed inbound/outbound messages and the two collaborator
//! traits the protocol core talks to.
//!
//! # Main types
//!
//! - [`RobochatError`]: Unified error enum.
//! - [`RobochatResult`]: Convenience alias for `Result<T, RobochatError>`.
//! - [`StatusCode`]: Two-tier status code returned by every endpoint.
//! - [`InboundMessage`]: A decoded answer or pushed message.
//! - [`OutboundQuestion`]: A question to submit.
//! - [`QaService`]: The remote service.
//! - [`Renderer`]: The presentation collaborator.

/// Error taxonomy.
pub mod error;
/// Typed inbound messages.
pub mod message;
/// Outbound questions and direct-action builders.
pub mod question;
/// Presentation collaborator.
pub mod render;
/// Remote service trait.
pub mod service;
/// Status codes.
pub mod status;
/// JSON request/response bodies.
pub mod wire;

pub use error::{RobochatError, RobochatResult};
pub use message::{
    AnswerOption, ComplaintDetail, ComplaintMessage, ComplaintPreview, InboundMessage,
    KnowledgeContent, KnowledgeSection, LeaveMessage, OptionList,
};
pub use question::{KnowledgeNav, OutboundQuestion};
pub use render::{ComplaintView, FollowUp, Origin, Renderable, Renderer};
pub use service::{Credentials, QaService};
pub use status::{StatusClass, StatusCode, SESSION_UNKNOWN};
