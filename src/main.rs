use agendabot::startup;
use tracing::{error, info};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting agendabot");

    // Load configuration
    let config = startup::load_config()?;

    let orchestrator = startup::build_orchestrator(config)?;

    let summary = match orchestrator.run_workflow(None, None, true).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Workflow aborted: {}", e);
            return Err(e.into());
        }
    };

    println!("📧 Emails processed: {}", summary.emails_processed);
    println!(
        "📅 Events created: {} (skipped {}, failed {})",
        summary.events_created, summary.events_skipped, summary.events_failed
    );
    println!("{}", summary.digest);
    if !summary.notification_sent {
        println!("📱 Digest was not delivered, see the log for details");
    }

    Ok(())
}
