//! Places review service entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    places_reviews::server::run().await
}
