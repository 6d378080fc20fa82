mod flow;
mod phone;
mod proof;
mod token;

pub use flow::*;
pub use phone::*;
pub use proof::*;
pub use token::*;
