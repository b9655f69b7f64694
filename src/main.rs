mod aggregate;
mod chart;
mod date_range;
mod error;
mod sort_rows;

use anyhow::Result;
use clap::Parser;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::{path::PathBuf, sync::Arc};
use tokio::{sync::Semaphore, time::Duration};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
	/// Most recent chart week to fetch (YYYY-MM-DD)
	#[arg(long)]
	first_week: String,

	/// Earliest chart week to walk back toward (YYYY-MM-DD)
	#[arg(long)]
	last_week: String,

	/// Chart archive URL prefix; the week date is appended per request
	#[arg(long, default_value = "https://www.billboard.com/charts/hot-100/")]
	base_url: String,

	#[arg(short, long, default_value_t = 25)]
	limit: u16,

	#[arg(short, long, default_value_t = 0)]
	retries: u16,

	#[arg(short, long, default_value = "output")]
	data_dir: PathBuf,
}

fn chart_url(base_url: &str, week: &str) -> String {
	if base_url.ends_with('/') {
		format!("{}{}", base_url, week)
	} else {
		format!("{}/{}", base_url, week)
	}
}

#[test]
fn test_chart_url() {
	const TEST_URLS: [(&str, &str, &str); 3] = [
		(
			"https://www.billboard.com/charts/hot-100/",
			"2019-05-12",
			"https://www.billboard.com/charts/hot-100/2019-05-12",
		),
		(
			"https://www.billboard.com/charts/hot-100",
			"2019-05-12",
			"https://www.billboard.com/charts/hot-100/2019-05-12",
		),
		(
			"https://example.com/charts/country/",
			"2001-09-01",
			"https://example.com/charts/country/2001-09-01",
		),
	];

	for (base, week, expected) in TEST_URLS {
		let result = chart_url(base, week);
		assert_eq!(
			result.as_str(),
			expected,
			"Expected '{}' for base '{}' and week '{}', but got '{}'",
			expected,
			base,
			week,
			result
		);
	}
}

// Fan out one fetch per URL over a fixed-size worker pool, then hand results
// back in submission order. A fetch that still fails after its retries
// aborts the whole batch.
async fn fetch_all(urls: &[String], limit: u16, retries: u16) -> Result<Vec<chart::WeekRecord>> {
	let progress_bar = ProgressBar::new(urls.len() as u64);
	progress_bar.set_style(
		ProgressStyle::default_bar()
			.template("{msg} {spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta_precise})")
			.expect("Failed to set progress bar style.")
			.progress_chars("##-"),
	);
	progress_bar.set_message("Fetching chart weeks");

	let semaphore = Arc::new(Semaphore::new(limit.into()));

	let futures = urls
		.iter()
		.enumerate()
		.map(|(index, url)| {
			let pb = progress_bar.clone();
			let semaphore = Arc::clone(&semaphore);

			Box::pin(async move {
				let _permit = semaphore
					.acquire()
					.await
					.expect("Failed to acquire semaphore");

				let mut attempts: u64 = 0;
				let mut result = chart::fetch_chart_week(url).await;
				while result.is_err() && attempts < retries.into() {
					attempts += 1;
					error!(
						"Retrying chart week fetch ({}/{}) for {}",
						attempts, retries, url
					);
					tokio::time::sleep(Duration::from_secs(2 * attempts)).await;
					result = chart::fetch_chart_week(url).await;
				}

				tokio::time::sleep(Duration::from_millis(1000)).await;
				pb.inc(1);

				(index, result)
			})
		})
		.collect::<FuturesUnordered<_>>();

	let mut indexed = futures.collect::<Vec<_>>().await;
	progress_bar.finish_with_message("Done");

	indexed.sort_by_key(|(index, _)| *index);

	let mut records = Vec::with_capacity(indexed.len());
	for (_, result) in indexed {
		records.push(result?);
	}

	Ok(records)
}

#[tokio::main]
async fn main() -> Result<()> {
	if pretty_env_logger::try_init().is_err() {
		log::warn!("Logger is already initialized.");
	}

	let args = Args::parse();

	let weeks: Vec<String> =
		date_range::week_range(&args.first_week, &args.last_week)?.collect();
	let urls: Vec<String> = weeks
		.iter()
		.map(|week| chart_url(&args.base_url, week))
		.collect();

	log::info!(
		"Scraping {} chart weeks from {} back to {}",
		urls.len(),
		args.first_week,
		args.last_week
	);

	let records = fetch_all(&urls, args.limit, args.retries).await?;

	let scraped_items: usize = records.iter().map(Vec::len).sum();
	log::info!(
		"Aggregating {} chart items across {} weeks",
		scraped_items,
		records.len()
	);

	let rows = aggregate::aggregate(&records);

	std::fs::create_dir_all(&args.data_dir)?;
	let snapshot_path = args.data_dir.join(aggregate::SNAPSHOT_FILE);
	aggregate::write_snapshot(&rows, &snapshot_path)?;

	log::info!(
		"Wrote {} aggregated tracks to {}",
		rows.len(),
		snapshot_path.display()
	);

	Ok(())
}
