use super::{dashboard, ui};
use crate::controller::ViewController;
use anyhow::Result;
use tracing::debug;

/// Fetches everything once, waits for all responses and prints the dashboard.
pub async fn run(mut controller: ViewController) -> Result<()> {
    controller.mount();

    let pb = ui::new_spinner("Fetching live rates and market insight...");
    let updates = controller.settle().await;
    pb.finish_and_clear();
    debug!(?updates, "All requests settled");

    println!("{}", dashboard::render(&controller.view()));
    Ok(())
}
