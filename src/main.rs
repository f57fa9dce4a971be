use labour_tracker::app;
use log::error;

/// Main entry point for the tracker web application
///
/// Connects to the backing sheet once, then serves the login page, the
/// tracker page and its JSON API until the process is stopped.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = app::run().await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
