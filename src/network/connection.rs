// HTTP connection handler: one request, one response, then close

use bytes::BytesMut;
use log::debug;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{
    http::{HttpRequest, HttpResponse, StatusCode},
    router::Router,
    NetworkError, Result,
};

pub struct Connection {
    stream: TcpStream,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    router: Arc<Router>,
}

impl Connection {
    pub fn new(stream: TcpStream, router: Arc<Router>) -> Self {
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(8192),
            write_buffer: BytesMut::with_capacity(8192),
            router,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let response = match self.read_request().await {
            Ok(request) => {
                // The query pipeline is synchronous and the store may block
                let router = Arc::clone(&self.router);
                tokio::task::spawn_blocking(move || router.handle(&request))
                    .await
                    .unwrap_or_else(|e| {
                        HttpResponse::error(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "InternalError",
                            &e.to_string(),
                        )
                    })
            }
            Err(NetworkError::InvalidRequest(message)) => {
                HttpResponse::error(StatusCode::BAD_REQUEST, "InvalidRequest", &message)
            }
            Err(e @ NetworkError::RequestTooLarge { .. }) => {
                HttpResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "RequestTooLarge", &e.to_string())
            }
            Err(e) => return Err(e),
        };

        debug!("Responding {}", response.status);
        self.send_response(&response).await?;
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<HttpRequest> {
        loop {
            if let Some(request) = HttpRequest::decode(&mut self.read_buffer)? {
                return Ok(request);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Err(NetworkError::ConnectionClosed);
            }
        }
    }

    async fn send_response(&mut self, response: &HttpResponse) -> Result<()> {
        self.write_buffer.clear();
        response.encode(&mut self.write_buffer);
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
