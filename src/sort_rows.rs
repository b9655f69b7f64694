use std::borrow::Cow;

pub trait SortableField {
	fn get_field(&self, field: &str) -> Cow<str>;
}

fn numeric_field(s: &str) -> Option<u32> {
	let trimmed = s.trim();
	if trimmed.is_empty() {
		return None;
	}
	trimmed.parse::<u32>().ok()
}

// Numeric fields compare as integers so that 10 sorts after 2; everything
// else compares as strings. Stable, so ties keep their prior order.
pub fn sort<T: SortableField>(entries: &mut [T], sort_field: &str) {
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
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
struct Row {
	label: String,
	count: u32,
}

#[cfg(test)]
impl SortableField for Row {
	fn get_field(&self, field: &str) -> Cow<str> {
		match field {
			"label" => Cow::Borrowed(&self.label),
			"count" => Cow::Owned(self.count.to_string()),
			_ => panic!("Invalid field: {}", field),
		}
	}
}

#[cfg(test)]
fn row(label: &str, count: u32) -> Row {
	Row {
		label: label.to_string(),
		count,
	}
}

#[test]
fn test_sort_numeric_fields() {
	let mut rows = vec![row("a", 10), row("b", 2), row("c", 31)];
	sort(&mut rows, "count");

	let counts: Vec<u32> = rows.iter().map(|r| r.count).collect();
	assert_eq!(counts, vec![2, 10, 31], "Expected numeric ordering, got {:?}", rows);
}

#[test]
fn test_sort_string_fields() {
	let mut rows = vec![row("pear", 1), row("apple", 2), row("mango", 3)];
	sort(&mut rows, "label");

	let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
	assert_eq!(labels, vec!["apple", "mango", "pear"]);
}

#[test]
fn test_sort_is_stable_for_ties() {
	let mut rows = vec![row("first", 5), row("second", 5), row("third", 5)];
	sort(&mut rows, "count");

	let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
	assert_eq!(
		labels,
		vec!["first", "second", "third"],
		"Expected ties to keep their prior order"
	);
}
