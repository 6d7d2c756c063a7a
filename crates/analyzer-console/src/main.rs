use std::path::Path;

use anyhow::Context;
use clap::Parser;

use analyzer_client::ReportClient;
use analyzer_console::config::default_log_dir;
use analyzer_console::views::{filter_reports, DetailTab, HeaderStats, HostsView, ReportCard};
use analyzer_console::{console, logging, text, Cli, Commands, ConsoleConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command();

    if command == Commands::Console {
        let log_path = logging::init_file(cli.verbose, &default_log_dir())?;
        tracing::info!(log = %log_path.display(), "logging to file");
    } else {
        logging::init_stderr(cli.verbose);
    }

    let config = ConsoleConfig::resolve(cli.config.as_deref(), cli.api_url.as_deref(), |key| {
        std::env::var(key).ok()
    })?;
    tracing::debug!(?config, "configuration resolved");

    let client = ReportClient::new(&config.api_base_url)
        .with_context(|| format!("cannot use backend {}", config.api_base_url))?;

    match command {
        Commands::Console => console::run_console(&config, client).await,
        Commands::Info => {
            let info = client.app_info().await.context("failed to load app info")?;
            println!("{}", text::render_app_info(&info));
            Ok(())
        }
        Commands::List { search } => {
            let list = client.list_reports().await.context("failed to load reports")?;
            let stats = client.summary_stats(&list.reports).await;
            let cards: Vec<ReportCard> = filter_reports(&list.reports, search.as_deref().unwrap_or(""))
                .into_iter()
                .map(ReportCard::from_summary)
                .collect();
            println!("{}", text::render_stats(&HeaderStats::from(stats)));
            println!();
            println!("{}", text::render_report_list(&cards));
            Ok(())
        }
        Commands::Show { id, tab } => show(&client, &id, tab).await,
        Commands::Hosts { id } => {
            let detail = client
                .report_detail(&id, None)
                .await
                .with_context(|| format!("failed to load report {id}"))?;
            println!("{}", text::render_hosts(&HostsView::build(&detail.connections)));
            Ok(())
        }
        Commands::Stats => {
            // The fallback needs the list; a failed list still yields backend stats.
            let reports = match client.list_reports().await {
                Ok(list) => list.reports,
                Err(e) => {
                    tracing::warn!(error = %e, "report list unavailable for stats fallback");
                    Vec::new()
                }
            };
            let stats = client.summary_stats(&reports).await;
            println!("{}", text::render_stats(&HeaderStats::from(stats)));
            Ok(())
        }
        Commands::Upload { file } => {
            let receipt = client
                .upload_report(&file)
                .await
                .with_context(|| format!("failed to upload {}", file.display()))?;
            println!("{}", text::render_upload(&receipt));
            Ok(())
        }
        Commands::Download { id, output } => {
            let dir = output.as_deref().unwrap_or(config.download_dir.as_path());
            download(&client, &id, dir).await
        }
        Commands::Delete { id } => {
            let receipt = client
                .delete_report(&id)
                .await
                .with_context(|| format!("failed to delete report {id}"))?;
            println!(
                "{}",
                receipt
                    .message
                    .unwrap_or_else(|| format!("Report {id} deleted"))
            );
            Ok(())
        }
        Commands::Health => {
            let health = client.health().await.context("health check failed")?;
            println!("{}", text::render_health(&health));
            if !health.is_healthy() {
                anyhow::bail!("backend reports status {:?}", health.status);
            }
            Ok(())
        }
    }
}

async fn show(client: &ReportClient, id: &str, tab: DetailTab) -> anyhow::Result<()> {
    // Merge with the list row the same way the console does when a card is opened.
    let summary = match client.list_reports().await {
        Ok(list) => list.find(id).cloned(),
        Err(e) => {
            tracing::warn!(error = %e, "report list unavailable, showing detail only");
            None
        }
    };
    let detail = client
        .report_detail(id, summary.as_ref())
        .await
        .with_context(|| format!("failed to load report {id}"))?;
    println!("{}", text::render_detail(&detail, tab));
    Ok(())
}

async fn download(client: &ReportClient, id: &str, dir: &Path) -> anyhow::Result<()> {
    let report = client
        .download_report(id)
        .await
        .with_context(|| format!("failed to download report {id}"))?;
    let path = report
        .save_into(dir)
        .await
        .with_context(|| format!("failed to save into {}", dir.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}
