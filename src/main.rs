use taskmate::{AppConfig, AppResult};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::load_with_dotenv()?;
    taskmate::init_tracing();
    taskmate::run(config).await
}
