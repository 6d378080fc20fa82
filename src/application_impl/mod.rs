mod access_service_impl;
mod admin_service_impl;
mod proof_codec_impl;

pub use access_service_impl::*;
pub use admin_service_impl::*;
pub use proof_codec_impl::*;
