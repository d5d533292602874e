//! Dry-run a small transfer protocol against the chatterbox backend.
//!
//! ```sh
//! cargo run -p lab-handler --example chatterbox_demo
//! ```

use anyhow::Result;
use lab_handler::backends::ChatterboxBackend;
use lab_handler::LiquidHandler;
use lab_resources::catalog::{cos_96_ez_wash, flex_96_tiprack_200ul};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut lh = LiquidHandler::new(ChatterboxBackend::new(8));
    lh.setup().await?;

    lh.assign_resource(flex_96_tiprack_200ul("tips")?, "C1", false)
        .await?;
    lh.assign_resource(cos_96_ez_wash("source")?, "C2", false).await?;
    lh.assign_resource(cos_96_ez_wash("target")?, "C3", false).await?;

    // Pretend the source plate arrives with liquid in column 1.
    for row in ["A", "B", "C", "D", "E", "F", "G", "H"] {
        if let Some(tracker) = lh
            .deck_mut()
            .get_mut(&format!("source_{row}1"))
            .and_then(|w| w.tracker_mut())
        {
            tracker.set_volume(200.0);
        }
    }

    println!("{}", lh.summary()?);

    lh.pick_up_tips("tips", &["A1"], None).await?;
    lh.transfer("source", "A1", "target", "A1", 50.0).await?;
    lh.transfer("source", "B1", "target", "B1", 50.0).await?;
    lh.discard_tips(None).await?;
    lh.home().await?;
    lh.stop().await?;

    Ok(())
}
