use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};

pub const WEEK_FORMAT: &str = "%Y-%m-%d";

/// Lazy walk over chart weeks, newest first, 7 days apart.
#[derive(Debug, Clone)]
pub struct WeekRange {
	current: NaiveDate,
	remaining: u32,
}

fn parse_week(week: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(week.trim(), WEEK_FORMAT)
		.map_err(|e| Error::InvalidRange(format!("Malformed week date '{}': {}", week, e)))
}

// Entry count policy: round(days / 7). The earliest week falls out of the
// range when the span is an exact multiple of 7 days.
pub fn week_range(first_week: &str, last_week: &str) -> Result<WeekRange> {
	let first = parse_week(first_week)?;
	let last = parse_week(last_week)?;

	if first <= last {
		return Err(Error::InvalidRange(format!(
			"First week {} must fall after last week {}",
			first_week, last_week
		)));
	}

	let days = (first - last).num_days();
	let remaining = (days as f64 / 7.0).round() as u32;

	Ok(WeekRange {
		current: first,
		remaining,
	})
}

impl Iterator for WeekRange {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		if self.remaining == 0 {
			return None;
		}

		let week = self.current.format(WEEK_FORMAT).to_string();
		self.current = self.current - Duration::days(7);
		self.remaining -= 1;

		Some(week)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.remaining as usize;
		(remaining, Some(remaining))
	}
}

#[test]
fn test_week_range_counts() {
	const TEST_RANGES: [(&str, &str, usize); 5] = [
		("2019-05-12", "2019-04-28", 2),
		("2020-01-08", "2020-01-01", 1),
		("2019-05-12", "2019-05-02", 1),
		("2019-05-12", "2019-05-01", 2),
		("2019-05-12", "2019-05-11", 0),
	];

	for (first, last, expected) in TEST_RANGES {
		let count = week_range(first, last)
			.expect("Failed to build week range")
			.count();
		assert_eq!(
			count, expected,
			"Expected {} weeks for range {} - {}, but got {}",
			expected, first, last, count
		);
	}
}

#[test]
fn test_week_range_walks_back_seven_days() {
	let weeks: Vec<String> = week_range("2019-05-12", "2019-04-28")
		.expect("Failed to build week range")
		.collect();

	assert_eq!(weeks, vec!["2019-05-12", "2019-05-05"]);

	let dates: Vec<NaiveDate> = weeks
		.iter()
		.map(|week| NaiveDate::parse_from_str(week, WEEK_FORMAT).unwrap())
		.collect();
	for pair in dates.windows(2) {
		assert_eq!(
			(pair[0] - pair[1]).num_days(),
			7,
			"Expected consecutive weeks {} and {} to be 7 days apart",
			pair[0],
			pair[1]
		);
	}
}

#[test]
fn test_week_range_is_restartable() {
	let range = week_range("2020-03-01", "2020-02-01").expect("Failed to build week range");
	let first_pass: Vec<String> = range.clone().collect();
	let second_pass: Vec<String> = range.collect();

	assert_eq!(first_pass, second_pass);
	assert_eq!(first_pass.len(), 4);
}

#[test]
fn test_week_range_rejects_bad_input() {
	const TEST_RANGES: [(&str, &str); 4] = [
		("2019-04-28", "2019-05-12"),
		("2019-05-12", "2019-05-12"),
		("not-a-date", "2019-04-28"),
		("2019-05-12", "2019-13-01"),
	];

	for (first, last) in TEST_RANGES {
		let result = week_range(first, last);
		assert!(
			matches!(result, Err(Error::InvalidRange(_))),
			"Expected InvalidRange for range {} - {}",
			first,
			last
		);
	}
}
