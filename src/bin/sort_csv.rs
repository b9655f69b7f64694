use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
	#[arg(long, required = true)]
	file: String,

	#[arg(long, default_value = "title")]
	field: String,
}

pub trait SortableField {
	fn get_field(&self, field: &str) -> Cow<str>;
}

#[derive(Serialize, Deserialize, Debug)]
struct TrackAggregate {
	title: String,
	artist: String,
	weeks: String,
	week_count: u32,
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

fn numeric_field(s: &str) -> Option<u32> {
	let trimmed = s.trim();
	if trimmed.is_empty() {
		return None;
	}
	trimmed.parse::<u32>().ok()
}

pub fn sort<T: SortableField>(mut entries: Vec<T>, sort_field: &str) -> Vec<T> {
	entries.sort_by(|a, b| {
		let a_field = a.get_field(sort_field);
		let b_field = b.get_field(sort_field);

		match (numeric_field(&a_field), numeric_field(&b_field)) {
			(Some(a_number), Some(b_number)) => a_number.cmp(&b_number),
			(Some(_), None) => std::cmp::Ordering::Less,
			(None, Some(_)) => std::cmp::Ordering::Greater,
			(None, None) => a_field.cmp(&b_field),
		}
	});

	entries
}

fn main() -> Result<()> {
	let args = Args::parse();

	let mut reader = csv::Reader::from_path(&args.file)?;
	let entries: Vec<TrackAggregate> = reader.deserialize().collect::<Result<Vec<_>, _>>()?;

	let sorted_entries = sort(entries, &args.field);

	let mut writer = csv::Writer::from_path(&args.file)?;
	for entry in &sorted_entries {
		writer.serialize(entry)?;
	}
	writer.flush()?;

	Ok(())
}
