//! TOML settings selected by build profile, plus the CLI override;
//! verified manually via `bin/settings_demo.rs`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
