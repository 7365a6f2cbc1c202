/*
 * Responsibility
 * - start the tokio runtime and hand over to app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    agenda_api::app::run().await
}
