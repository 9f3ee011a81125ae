use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    acct_watch_daemon::run().await?;
    Ok(())
}
