//! `QuizroomServer` builder and accept loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use quizroom_session::DEFAULT_GRACE;

use crate::handler::handle_connection;
use crate::state::AppState;
use crate::QuizroomError;

/// Builder for configuring and starting a quiz server.
///
/// # Example
///
/// ```rust,ignore
/// let server = QuizroomServer::builder()
///     .bind("0.0.0.0:3001")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct QuizroomServerBuilder {
    bind_addr: String,
    host_grace: Duration,
}

impl QuizroomServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            host_grace: DEFAULT_GRACE,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a room waits for a dropped host before promoting a
    /// replacement.
    pub fn host_grace(mut self, grace: Duration) -> Self {
        self.host_grace = grace;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<QuizroomServer, QuizroomError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let state = Arc::new(AppState::new(self.host_grace));
        Ok(QuizroomServer { listener, state })
    }
}

impl Default for QuizroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running quiz server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct QuizroomServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl QuizroomServer {
    pub fn builder() -> QuizroomServerBuilder {
        QuizroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), QuizroomError> {
        tracing::info!("quizroom server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "inbound connection");
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
