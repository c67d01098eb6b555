use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ragchat_cli::main_entry().await
}
