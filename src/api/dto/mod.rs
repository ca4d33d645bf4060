//! Data Transfer Objects for REST response serialization.

pub mod event_dto;

pub use event_dto::*;
