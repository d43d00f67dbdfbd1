// HTTP/1.1 transport for the query service

pub mod connection;
pub mod http;
pub mod router;
pub mod server;

// Re-export commonly used types
pub use connection::Connection;
pub use http::{HttpRequest, HttpResponse, Method};
pub use router::Router;
pub use server::Server;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    #[error("Connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, NetworkError>;

// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

// Upper bound on head plus body of a single request
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;
