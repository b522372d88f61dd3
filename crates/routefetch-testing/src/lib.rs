//! Testing utilities for routefetch clients
//!
//! - [`MockServer`] listens on a local port, answers from registered
//!   expectations and records what it receives.
//! - [`RecordingTransport`] plugs into a client in place of the network and
//!   keeps every [`FinalizedRequest`](routefetch_core::FinalizedRequest).

pub mod expectation;
pub mod matcher;
pub mod recording;
pub mod server;

pub use expectation::{Expectation, MockResponse, Times};
pub use matcher::RequestMatcher;
pub use recording::{recording_client, RecordingTransport};
pub use server::{ExpectationBuilder, MockServer, RecordedRequest};
