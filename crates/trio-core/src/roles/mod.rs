//! Responder roles
//!
//! A role is a name, a model identifier and a prompt. Every persona in the
//! system (discussion members, SDLC stages) is one parameterised
//! [`Responder`] selected by configuration.

mod descriptor;
mod prompts;
mod responder;

pub use descriptor::{RoleContext, RoleDescriptor};
pub use prompts::{builtin_prompt, BUILTIN_ROLES};
pub use responder::Responder;
