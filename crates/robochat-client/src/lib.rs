//! Protocol client for the robochat question-answering service.
//!
//! # Main types
//!
//! - [`ChatClient`]: One conversation; owns every other component.
//! - [`AnswerClient`]: Submits questions, renewing an expired session once.
//! - [`PollLoop`]: Count, fetch and confirm pushed messages.
//! - [`Dispatcher`]: Routes decoded messages to the renderer.
//! - [`HttpQaService`]: reqwest implementation of the service API.

/// Answer requests.
pub mod answer;
/// Client context object.
pub mod chat;
/// Client configuration.
pub mod config;
/// Message routing.
pub mod dispatch;
/// HTTP transport.
pub mod http;
/// Pushed message polling.
pub mod poll;

#[cfg(test)]
mod testing;

pub use answer::{AnswerClient, AnswerReply, MAX_SESSION_RETRIES};
pub use chat::{ChatClient, POLL_TIMER, REPLIED_STATUS, SUBMIT_TIMER};
pub use config::{ClientConfig, LoginConfig};
pub use dispatch::{route, Action, Dispatch, Dispatcher, Remember};
pub use http::HttpQaService;
pub use poll::{PollLoop, PollOutcome};
