use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Target URL must not be empty.")]
    UrlEmpty,
    #[error("Invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Target URL '{url}' has no host.")]
    UrlMissingHost { url: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration format '{value}'. Expected a number with an optional ms/s/m/h unit.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration number '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid duration unit '{unit}'. Expected ms, s, m, or h.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration is too large.")]
    DurationOverflow,
    #[error("Duration must be greater than zero.")]
    DurationZero,
    #[error("Payload size must be greater than zero.")]
    PayloadSizeZero,
}
