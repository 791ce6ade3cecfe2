// src/web/mod.rs
pub mod academia_handlers;
pub mod admin_handlers;
pub mod auth_handlers;
pub mod health_handlers;
pub mod mw_auth;
pub mod personal_handlers;
pub mod proprietario_handlers;
pub mod realtime_handlers;
pub mod routes;
