use clap::Subcommand;

#[derive(Subcommand)]
pub enum CounterAction {
    /// Current counters
    Show,
    /// Record one fold manually
    Increment,
    /// Zero the total and all daily history
    Reset,
}

pub async fn run(action: CounterAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker().await?;
    let today = chrono::Local::now().date_naive();

    match action {
        CounterAction::Show => {
            let counters = tracker.counters();
            let out = serde_json::json!({
                "total": counters.total().await?,
                "daily": counters.daily(today).await?,
                "hinge_angle": counters.hinge_angle().await?,
                "daily_limit": counters.daily_limit().await?,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        CounterAction::Increment => {
            let tally = tracker.record_fold().await?;
            println!("{}", serde_json::to_string_pretty(&tally)?);
        }
        CounterAction::Reset => {
            tracker.reset().await?;
            println!("counters reset");
        }
    }
    Ok(())
}
