use clap::Subcommand;
use foldtrack_core::{FoldDetector, SimulatedHinge};

#[derive(Subcommand)]
pub enum SimulateAction {
    /// Feed simulated hinge samples through the detector immediately
    /// (no 5-second pacing) and print emitted events as JSON lines
    Run {
        /// Number of samples to draw
        #[arg(long, default_value_t = 20)]
        ticks: u32,
        /// RNG seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub async fn run(action: SimulateAction) -> Result<(), Box<dyn std::error::Error>> {
    let SimulateAction::Run { ticks, seed } = action;

    let tracker = super::open_tracker().await?;
    let mut events = tracker.subscribe();
    let mut hinge = match seed {
        Some(seed) => SimulatedHinge::new(seed),
        None => SimulatedHinge::from_entropy(),
    };
    let mut detector = FoldDetector::new();

    for _ in 0..ticks {
        let sample = hinge.next_sample();
        tracker.handle_sample(&mut detector, sample).await?;
    }

    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
