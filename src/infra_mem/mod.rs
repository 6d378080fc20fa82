mod token_store_mem;

pub use token_store_mem::*;
