pub mod api;
pub mod logger;
pub mod settings;

pub mod server;

pub mod application_port;
pub mod application_impl;
pub mod domain_model;
pub mod domain_port;
pub mod infra_mem;
pub mod infra_notify;
pub mod infra_redis;
pub mod infra_sms;
