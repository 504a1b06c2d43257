use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    portal::cli::start()?.execute().await
}
