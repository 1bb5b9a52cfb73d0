use quizroom::{QuizroomError, QuizroomServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), QuizroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("QUIZROOM_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    let server = QuizroomServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %addr, "quizroom listening");
    server.run().await
}
