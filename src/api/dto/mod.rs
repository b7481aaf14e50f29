//! Data transfer objects for REST responses.

pub mod connection_dto;
pub mod ingest_dto;

pub use connection_dto::{ConnectionDto, ConnectionListResponse};
pub use ingest_dto::IngestResponse;
