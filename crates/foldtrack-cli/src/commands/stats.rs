use clap::Subcommand;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Average, yearly projection, achievements, progress
    Show,
}

pub async fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker().await?;
    let today = chrono::Local::now().date_naive();

    match action {
        StatsAction::Show => {
            let snap = tracker.stats().snapshot(today).await?;
            println!("{}", serde_json::to_string_pretty(&snap)?);
        }
    }
    Ok(())
}
