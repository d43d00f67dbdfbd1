// HTTP TCP server

use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use super::{connection::Connection, router::Router, NetworkError, Result, DEFAULT_PORT};

pub struct Server {
    router: Arc<Router>,
    max_connections: usize,
}

impl Server {
    pub fn new(router: Arc<Router>, max_connections: usize) -> Self {
        Self {
            router,
            max_connections,
        }
    }

    pub async fn run(&self, addr: Option<SocketAddr>) -> Result<()> {
        let addr = addr.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!("odatalite listening on {}", listener.local_addr()?);

        // Connection limiter
        let connection_semaphore = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let (stream, peer_addr) = listener.accept().await?;

            // Clone what we need for the spawned task
            let router = self.router.clone();
            let semaphore = connection_semaphore.clone();

            // Spawn a task to handle this connection
            tokio::spawn(async move {
                // Acquire connection permit
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        error!("Failed to acquire connection permit");
                        return;
                    }
                };

                debug!("New connection from {}", peer_addr);

                match handle_connection(stream, router).await {
                    Ok(()) | Err(NetworkError::ConnectionClosed) => {}
                    Err(e) => error!("Connection error from {}: {}", peer_addr, e),
                }

                debug!("Connection closed from {}", peer_addr);
            });
        }
    }
}

async fn handle_connection(stream: TcpStream, router: Arc<Router>) -> Result<()> {
    let mut connection = Connection::new(stream, router);
    connection.run().await
}
