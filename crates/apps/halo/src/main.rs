//! Halo - label mail from members of ⭕ contact groups
//!
//! One run reconciles Gmail labels and filters with the managed contact
//! groups, then exits. Silent unless `--verbose` or something fails.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use labelsync::{
    GmailClient, GoogleAuth, GoogleCredentials, GoogleHttp, PeopleClient, SyncConfig, sync_groups,
};
use log::{debug, error};

#[derive(Debug, Parser)]
#[command(name = "halo", version, about = "Sync Gmail labels and filters from ⭕ contact groups")]
struct Args {
    /// Log every phase and the collections computed along the way
    #[arg(short, long)]
    verbose: bool,

    /// OAuth client credentials file (Google Cloud Console JSON)
    #[arg(long, value_name = "PATH")]
    credentials: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Sync failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    config::init()?;

    let credentials = GoogleCredentials::load(args.credentials.as_deref()).inspect_err(|_| {
        if let Some(path) = GoogleCredentials::default_credentials_path() {
            error!(
                "To configure Google access, either:\n\
                 1. Place your OAuth client credentials at: {}\n\
                 2. Pass --credentials <PATH>\n\
                 3. Or set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET",
                path.display()
            );
        }
    })?;

    let auth = Arc::new(GoogleAuth::new(&credentials)?);
    let http = GoogleHttp::new(auth);
    let people = PeopleClient::new(http.clone());
    let gmail = GmailClient::new(http);

    let stats = sync_groups(&people, &gmail, &SyncConfig::default())?;
    debug!("{:#?}", stats);
    Ok(())
}
