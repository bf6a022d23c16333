#[tokio::main]
async fn main() -> anyhow::Result<()> {
    faucet::cli::run().await
}
