use clap::Subcommand;

#[derive(Subcommand)]
pub enum LimitAction {
    /// Current daily limit
    Show,
    /// Set the daily limit
    Set { limit: u32 },
}

pub async fn run(action: LimitAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker().await?;

    match action {
        LimitAction::Show => {
            println!("{}", tracker.counters().daily_limit().await?);
        }
        LimitAction::Set { limit } => {
            tracker.set_daily_limit(limit).await?;
            println!("daily limit set to {limit}");
        }
    }
    Ok(())
}
