use std::path::Path;
use std::process::ExitCode;

use dotenv::dotenv;
use driving_test_times::{
    Dataset, GithubContentsStore, PublishAdapter, ScrapingContext, UploadingConfig,
    config::LOG_FILE, logging, publish, scrape_succeeded,
};
use log::{error, info};

extern crate env_logger;
extern crate log;

async fn run_scraping_job(context: ScrapingContext) -> Option<Dataset> {
    match context.scrape_in_browser().await {
        Ok(run) => Some(run.dataset),
        Err(e) => {
            error!("Error in main scraping function: {e:#}");
            None
        }
    }
}

/// Save and publish `dataset`. Failures here are logged and never change the
/// job's exit status.
async fn run_publish_job(dataset: &Dataset, data_path: &Path) {
    let store = match UploadingConfig::new().and_then(|config| GithubContentsStore::new(&config)) {
        Ok(store) => store,
        Err(e) => {
            error!("Remote store is not configured: {e:#}");
            match publish::encode_dataset(dataset)
                .and_then(|document| publish::save_local(&document, data_path))
            {
                Ok(()) => info!("Data saved locally to {}", data_path.display()),
                Err(e) => error!("Failed to save data locally: {e}"),
            }
            error!("Failed to update GitHub");
            return;
        }
    };

    match PublishAdapter::new(store, data_path).publish(dataset).await {
        Ok(report) if report.remote.is_ok() => info!("Successfully updated GitHub"),
        Ok(_) => error!("Failed to update GitHub"),
        Err(e) => error!("Failed to encode dataset: {e}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    logging::init(Path::new(LOG_FILE));

    info!("Starting scraping job");
    let context = match ScrapingContext::new() {
        Ok(context) => context,
        Err(e) => {
            error!("Error in main job: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let data_path = context.scraping_config.data_path.clone();

    let dataset = run_scraping_job(context).await;
    if !scrape_succeeded(dataset.as_ref()) {
        error!("Scraping failed");
        return ExitCode::FAILURE;
    }
    if let Some(dataset) = &dataset {
        run_publish_job(dataset, &data_path).await;
    }

    info!("Job completed successfully");
    ExitCode::SUCCESS
}
