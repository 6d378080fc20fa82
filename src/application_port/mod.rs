mod access_service;
mod admin_service;
mod session_proof;

pub use access_service::*;
pub use admin_service::*;
pub use session_proof::*;
