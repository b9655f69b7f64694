use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the scrape pipeline
#[derive(Error, Debug)]
pub enum Error {
	/// Malformed or inverted week dates, detected before any network activity
	#[error("Invalid week range: {0}")]
	InvalidRange(String),

	/// Transport failure or timeout for one week's request
	#[error("Failed to fetch {url}: {source}")]
	Fetch {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	/// Non-404 HTTP error status
	#[error("Failed to fetch {url} - Status: {status}")]
	Status {
		url: String,
		status: reqwest::StatusCode,
	},

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
}
