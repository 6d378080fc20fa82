mod code_sender;
mod notify;
mod token_store;

pub use code_sender::*;
pub use notify::*;
pub use token_store::*;
