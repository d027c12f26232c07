mod admin;
mod client;
pub mod dto;
mod files;
mod functions;
mod messages;
pub mod response;
mod router;
pub mod validation;

pub use router::{AppState, create_router};
