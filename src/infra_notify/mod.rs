mod notifier_log;
mod notifier_mail;

pub use notifier_log::*;
pub use notifier_mail::*;
