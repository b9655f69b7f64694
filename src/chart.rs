use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;

// Chart Item Selectors
static TITLE_SELECTOR: Lazy<Selector> =
	Lazy::new(|| Selector::parse("span.chart-element__information__song").unwrap());
static ARTIST_SELECTOR: Lazy<Selector> =
	Lazy::new(|| Selector::parse("span.chart-element__information__artist").unwrap());
static RANK_SELECTOR: Lazy<Selector> =
	Lazy::new(|| Selector::parse("span.chart-element__rank__number").unwrap());

static WEEK_SUFFIX_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})/?$").unwrap());

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One chart item as displayed for one week. Text fields carry the raw
/// trimmed page text with no further cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
	pub title: String,
	pub artist: String,
	pub rank: u32,
	pub week: String,
}

pub type WeekRecord = Vec<ChartEntry>;

// Week identifier policy: trailing date suffix of the URL, falling back to
// the last path segment.
pub fn week_from_url(url: &str) -> String {
	if let Some(caps) = WEEK_SUFFIX_RE.captures(url) {
		return caps[1].to_string();
	}

	url.trim_end_matches('/')
		.rsplit('/')
		.next()
		.unwrap_or(url)
		.to_string()
}

fn select_texts(document: &Html, selector: &Selector) -> Vec<String> {
	document
		.select(selector)
		.map(|element| {
			element
				.text()
				.collect::<Vec<_>>()
				.join("")
				.trim()
				.to_string()
		})
		.collect()
}

pub fn parse_chart(document: &Html, week: &str) -> WeekRecord {
	let titles = select_texts(document, &TITLE_SELECTOR);
	let artists = select_texts(document, &ARTIST_SELECTOR);
	let ranks = select_texts(document, &RANK_SELECTOR);

	let mut entries = WeekRecord::with_capacity(titles.len());

	for ((title, artist), rank_text) in titles.into_iter().zip(artists).zip(ranks) {
		let rank = match rank_text.parse::<u32>() {
			Ok(rank) => rank,
			Err(_) => {
				log::warn!(
					"Skipping chart item '{}' with unparsable rank '{}' for week {}",
					title,
					rank_text,
					week
				);
				continue;
			}
		};

		entries.push(ChartEntry {
			title,
			artist,
			rank,
			week: week.to_string(),
		});
	}

	entries
}

async fn request_page(url: &str) -> Result<Option<Html>> {
	let client = reqwest::Client::new();
	let response = client
		.get(url)
		.timeout(REQUEST_TIMEOUT)
		.header(reqwest::header::USER_AGENT, "reqwest/0.12.3 (rust)")
		.header(reqwest::header::REFERER, "https://www.billboard.com/")
		.send()
		.await
		.map_err(|source| Error::Fetch {
			url: url.to_string(),
			source,
		})?;

	log::debug!("Received status {} from {}", response.status(), url);

	if response.status() == reqwest::StatusCode::NOT_FOUND {
		return Ok(None);
	} else if !response.status().is_success() {
		return Err(Error::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}

	let body = response.text().await.map_err(|source| Error::Fetch {
		url: url.to_string(),
		source,
	})?;
	Ok(Some(Html::parse_document(&body)))
}

// Fetch one chart week. A missing page or a page with no chart items is
// valid data and yields an empty record, not an error.
pub async fn fetch_chart_week(url: &str) -> Result<WeekRecord> {
	let week = week_from_url(url);
	log::debug!("Fetching chart week {} from {}", week, url);

	let document = match request_page(url).await? {
		Some(document) => document,
		None => {
			log::warn!("Chart page does not exist: {}", url);
			return Ok(WeekRecord::new());
		}
	};

	let entries = parse_chart(&document, &week);
	if entries.is_empty() {
		log::debug!("No chart items found for week {}", week);
	} else {
		log::info!("Extracted {} chart items for week {}", entries.len(), week);
		if let Some(top) = entries.iter().find(|entry| entry.rank == 1) {
			log::debug!("Top of chart for week {}: {} - {}", week, top.title, top.artist);
		}
	}

	Ok(entries)
}

#[cfg(test)]
const CHART_FIXTURE: &str = r#"
<html><body>
<ol class="chart-list__elements">
	<li class="chart-list__element display--flex">
		<span class="chart-element__rank flex--column flex--xy-center">
			<span class="chart-element__rank__number">1</span>
		</span>
		<span class="chart-element__information">
			<span class="chart-element__information__song text--truncate color--primary"> Blinding Lights </span>
			<span class="chart-element__information__artist text--truncate color--secondary">The Weeknd</span>
		</span>
	</li>
	<li class="chart-list__element display--flex">
		<span class="chart-element__rank flex--column flex--xy-center">
			<span class="chart-element__rank__number">2</span>
		</span>
		<span class="chart-element__information">
			<span class="chart-element__information__song text--truncate color--primary">Circles</span>
			<span class="chart-element__information__artist text--truncate color--secondary">Post Malone</span>
		</span>
	</li>
	<li class="chart-list__element display--flex">
		<span class="chart-element__rank flex--column flex--xy-center">
			<span class="chart-element__rank__number">3</span>
		</span>
		<span class="chart-element__information">
			<span class="chart-element__information__song text--truncate color--primary">The Box</span>
			<span class="chart-element__information__artist text--truncate color--secondary">Roddy Ricch</span>
		</span>
	</li>
</ol>
</body></html>
"#;

#[test]
fn test_parse_chart_extracts_columns() {
	let document = Html::parse_document(CHART_FIXTURE);
	let entries = parse_chart(&document, "2020-01-18");

	assert_eq!(entries.len(), 3, "Expected 3 chart items, got {:?}", entries);
	assert_eq!(
		entries[0],
		ChartEntry {
			title: "Blinding Lights".to_string(),
			artist: "The Weeknd".to_string(),
			rank: 1,
			week: "2020-01-18".to_string(),
		}
	);
	assert_eq!(entries[2].title, "The Box");
	assert_eq!(entries[2].rank, 3);

	for entry in &entries {
		assert_eq!(
			entry.week, "2020-01-18",
			"Expected every entry to carry the week identifier"
		);
	}
}

#[test]
fn test_parse_chart_skips_unparsable_rank() {
	const FIXTURE: &str = r#"
	<li class="chart-list__element">
		<span class="chart-element__rank__number">--</span>
		<span class="chart-element__information__song">Ghost Town</span>
		<span class="chart-element__information__artist">Kanye West</span>
	</li>
	<li class="chart-list__element">
		<span class="chart-element__rank__number">12</span>
		<span class="chart-element__information__song">Lucid Dreams</span>
		<span class="chart-element__information__artist">Juice WRLD</span>
	</li>
	"#;

	let document = Html::parse_document(FIXTURE);
	let entries = parse_chart(&document, "2018-06-23");

	assert_eq!(entries.len(), 1, "Expected unparsable rank to be skipped");
	assert_eq!(entries[0].title, "Lucid Dreams");
	assert_eq!(entries[0].rank, 12);
}

#[test]
fn test_parse_chart_empty_page() {
	let document = Html::parse_document("<html><body><p>No results found.</p></body></html>");
	let entries = parse_chart(&document, "2020-01-18");

	assert!(
		entries.is_empty(),
		"Expected no entries for a page without chart markup, got {:?}",
		entries
	);
}

#[test]
fn test_week_from_url() {
	const TEST_URLS: [(&str, &str); 4] = [
		(
			"https://www.billboard.com/charts/hot-100/2019-05-12",
			"2019-05-12",
		),
		(
			"https://www.billboard.com/charts/hot-100/2019-05-12/",
			"2019-05-12",
		),
		("https://example.com/charts/latest", "latest"),
		("2020-02-29", "2020-02-29"),
	];

	for (url, expected) in TEST_URLS {
		let result = week_from_url(url);
		assert_eq!(
			result.as_str(),
			expected,
			"Expected week '{}' for url '{}', but got '{}'",
			expected,
			url,
			result
		);
	}
}
