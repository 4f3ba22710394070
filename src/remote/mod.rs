//! Backend collaborators
//!
//! Wire types are always available so projects can be inspected without the
//! HTTP stack. The client, the saver and the token manager need the
//! `remote` feature.

pub mod wire;

#[cfg(feature = "remote")]
pub mod client;
#[cfg(feature = "remote")]
pub mod saver;
#[cfg(feature = "remote")]
pub mod token;

pub use wire::{
    CreateProjectRequest, ErrorPayload, ProjectEnvelope, RenderRequest, RenderResponse,
    StoredProject, TokenResponse, UpdateProjectRequest,
};

#[cfg(feature = "remote")]
pub use client::RemoteClient;
#[cfg(feature = "remote")]
pub use saver::{ProjectSaver, SaveOutcome};
#[cfg(feature = "remote")]
pub use token::TokenManager;
