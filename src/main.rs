#[tokio::main]
async fn main() -> Result<(), top250::ScrapeError> {
    top250::run().await
}
