//! Middleware stack for the stub responder.
//!
//! Layer order: Request → Stub → (optional call-through) → Handler

pub mod stub;

pub use stub::{ReplaceStub, StubLayer, StubService, StubbedResponse, SuppressStub};
