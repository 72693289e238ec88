use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult, ValidationError};

/// Normalizes a raw target plus endpoint path into a full URL: the scheme
/// defaults to `http://` and the path to `/`, so a bare IP or hostname is
/// accepted as-is.
///
/// # Errors
///
/// Returns an error when the target is empty, unparsable, or has no host.
pub fn normalize_target(raw: &str, path: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(ValidationError::UrlEmpty));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: with_scheme.clone(),
            source: err,
        })
    })?;
    if url.host_str().is_none() {
        return Err(AppError::validation(ValidationError::UrlMissingHost {
            url: with_scheme,
        }));
    }

    let trimmed_path = path.trim();
    let full_path = if trimmed_path.starts_with('/') {
        trimmed_path.to_owned()
    } else {
        format!("/{}", trimmed_path)
    };
    url.set_path(&full_path);

    Ok(url)
}

/// Parses a duration argument such as `100ms`, `5s`, `2m`, or `1h`; a bare
/// number means seconds.
///
/// # Errors
///
/// Returns an error for empty input, an unknown unit, or a zero duration.
pub fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let value = s.trim();
    if value.is_empty() {
        return Err(AppError::validation(ValidationError::DurationEmpty));
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(AppError::validation(
            ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            },
        ));
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part.parse().map_err(|err| {
        AppError::validation(ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })
    })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or_else(|| AppError::validation(ValidationError::DurationOverflow))?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or_else(|| AppError::validation(ValidationError::DurationOverflow))?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(AppError::validation(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            }));
        }
    };

    if duration.as_millis() == 0 {
        return Err(AppError::validation(ValidationError::DurationZero));
    }

    Ok(duration)
}
