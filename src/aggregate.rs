use crate::chart::WeekRecord;
use crate::error::{Error, Result};
use crate::sort_rows::{self, SortableField};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, path::Path};

pub const SNAPSHOT_FILE: &str = "chart_corpus.csv";
pub const WEEK_DELIMITER: &str = ",";

/// Deduplicated record of one (title, artist) pair and every week it
/// appeared across the scrape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackAggregate {
	pub title: String,
	pub artist: String,
	pub weeks: String,
	pub week_count: u32,
}

impl SortableField for TrackAggregate {
	fn get_field(&self, field: &str) -> Cow<str> {
		match field {
			"title" => Cow::Borrowed(&self.title),
			"artist" => Cow::Borrowed(&self.artist),
			"weeks" => Cow::Borrowed(&self.weeks),
			"week_count" => Cow::Owned(self.week_count.to_string()),
			_ => panic!("Invalid field: {}", field),
		}
	}
}

// Group the flattened scrape by (title, artist). Exact case-sensitive match
// on the whitespace-trimmed pair; week identifiers keep flattening order.
pub fn aggregate(weeks: &[WeekRecord]) -> Vec<TrackAggregate> {
	let mut index: HashMap<(String, String), usize> = HashMap::new();
	let mut groups: Vec<((String, String), Vec<String>)> = Vec::new();

	for record in weeks {
		for entry in record {
			let key = (
				entry.title.trim().to_string(),
				entry.artist.trim().to_string(),
			);
			match index.get(&key) {
				Some(&slot) => groups[slot].1.push(entry.week.clone()),
				None => {
					index.insert(key.clone(), groups.len());
					groups.push((key, vec![entry.week.clone()]));
				}
			}
		}
	}

	let mut rows: Vec<TrackAggregate> = groups
		.into_iter()
		.map(|((title, artist), week_list)| TrackAggregate {
			title,
			artist,
			weeks: week_list.join(WEEK_DELIMITER),
			week_count: week_list.len() as u32,
		})
		.collect();

	// Stable two-pass sort: artist first, then title, so rows come out
	// ordered by the (title, artist) grouping key.
	sort_rows::sort(&mut rows, "artist");
	sort_rows::sort(&mut rows, "title");

	rows
}

pub fn render_snapshot(rows: &[TrackAggregate]) -> Result<Vec<u8>> {
	let mut writer = csv::Writer::from_writer(Vec::new());
	for row in rows {
		writer.serialize(row)?;
	}
	writer.flush()?;

	writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

// Written once per run; overwrites any previous snapshot.
pub fn write_snapshot(rows: &[TrackAggregate], path: &Path) -> Result<()> {
	let bytes = render_snapshot(rows)?;
	std::fs::write(path, bytes)?;

	Ok(())
}

#[cfg(test)]
fn entry(title: &str, artist: &str, rank: u32, week: &str) -> crate::chart::ChartEntry {
	crate::chart::ChartEntry {
		title: title.to_string(),
		artist: artist.to_string(),
		rank,
		week: week.to_string(),
	}
}

#[test]
fn test_aggregate_merges_weeks() {
	let week_a = vec![entry("Song X", "Artist Y", 1, "2020-01-01")];
	let week_b = vec![entry("Song X", "Artist Y", 3, "2020-01-08")];

	let rows = aggregate(&[week_a, week_b]);

	assert_eq!(rows.len(), 1, "Expected one aggregated row, got {:?}", rows);
	assert_eq!(
		rows[0],
		TrackAggregate {
			title: "Song X".to_string(),
			artist: "Artist Y".to_string(),
			weeks: "2020-01-01,2020-01-08".to_string(),
			week_count: 2,
		}
	);
}

#[test]
fn test_aggregate_trims_but_never_canonicalizes() {
	let week_a = vec![
		entry("  Speechless ", "Dan + Shay", 5, "2019-05-12"),
		entry("Tequila", "Dan + Shay", 21, "2019-05-12"),
	];
	let week_b = vec![
		entry("Speechless", "Dan + Shay", 7, "2019-05-05"),
		entry("Speechless", "Dan and Shay", 90, "2019-05-05"),
	];

	let rows = aggregate(&[week_a, week_b]);

	assert_eq!(rows.len(), 3, "Expected 3 distinct tracks, got {:?}", rows);

	let merged = rows
		.iter()
		.find(|row| row.artist == "Dan + Shay" && row.title == "Speechless")
		.expect("Trimmed title should merge with its untrimmed twin");
	assert_eq!(merged.week_count, 2);
	assert_eq!(merged.weeks, "2019-05-12,2019-05-05");

	let unmerged = rows
		.iter()
		.find(|row| row.artist == "Dan and Shay")
		.expect("Differently spelled artist should stay distinct");
	assert_eq!(unmerged.week_count, 1);
}

#[test]
fn test_aggregate_empty_week_contributes_nothing() {
	let empty: WeekRecord = Vec::new();
	let week = vec![entry("The Box", "Roddy Ricch", 1, "2020-01-18")];

	let rows = aggregate(&[empty, week]);

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].week_count, 1);

	let nothing = aggregate(&[Vec::new(), Vec::new()]);
	assert!(nothing.is_empty(), "Expected no rows from empty weeks");
}

#[test]
fn test_aggregate_count_matches_week_list() {
	let weeks: Vec<WeekRecord> = (0..5)
		.map(|i| {
			vec![
				entry("Circles", "Post Malone", 2, &format!("2020-01-{:02}", i + 1)),
				entry("Memories", "Maroon 5", 9, &format!("2020-01-{:02}", i + 1)),
			]
		})
		.collect();

	for row in aggregate(&weeks) {
		let listed = row.weeks.split(WEEK_DELIMITER).count() as u32;
		assert_eq!(
			row.week_count, listed,
			"Expected week_count to match weeks field for {:?}",
			row
		);
	}
}

#[test]
fn test_aggregate_rows_sorted_by_title_then_artist() {
	let week = vec![
		entry("Sunflower", "Post Malone", 4, "2019-05-12"),
		entry("Happier", "Marshmello", 8, "2019-05-12"),
		entry("Happier", "Ed Sheeran", 60, "2019-05-12"),
	];

	let rows = aggregate(&[week]);
	let order: Vec<(&str, &str)> = rows
		.iter()
		.map(|row| (row.title.as_str(), row.artist.as_str()))
		.collect();

	assert_eq!(
		order,
		vec![
			("Happier", "Ed Sheeran"),
			("Happier", "Marshmello"),
			("Sunflower", "Post Malone"),
		]
	);
}

#[test]
fn test_snapshot_rendering_is_idempotent() {
	let weeks = vec![
		vec![entry("Song X", "Artist Y", 1, "2020-01-01")],
		vec![entry("Song X", "Artist Y", 3, "2020-01-08")],
	];

	let first = render_snapshot(&aggregate(&weeks)).expect("Failed to render snapshot");
	let second = render_snapshot(&aggregate(&weeks)).expect("Failed to render snapshot");

	assert_eq!(first, second, "Expected byte-identical snapshots");

	let text = String::from_utf8(first).expect("Snapshot should be valid UTF-8");
	assert_eq!(
		text,
		"title,artist,weeks,week_count\nSong X,Artist Y,\"2020-01-01,2020-01-08\",2\n"
	);
}
