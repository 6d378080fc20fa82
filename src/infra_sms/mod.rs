mod code_sender_fake;
mod code_sender_twilio;

pub use code_sender_fake::*;
pub use code_sender_twilio::*;
