use anyhow::anyhow;
use chrono::{
  Local,
  NaiveDate
};
use regex::Regex;

pub const ISO_DATE_FORMAT: &str =
  "%Y-%m-%d";
pub const DEFAULT_DISPLAY_FORMAT: &str =
  "%d.%m.%Y";

/// Parses a strict `YYYY-MM-DD` calendar
/// date. Surrounding whitespace is
/// ignored.
pub fn parse_iso_date(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  let trimmed = raw.trim();
  let shape = Regex::new(
    r"^\d{4}-\d{2}-\d{2}$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile failure: \
       {e}"
    )
  })?;
  if !shape.is_match(trimmed) {
    return Err(anyhow!(
      "expected YYYY-MM-DD date, got: \
       {trimmed:?}"
    ));
  }

  NaiveDate::parse_from_str(
    trimmed,
    ISO_DATE_FORMAT
  )
  .map_err(|err| {
    anyhow!(
      "invalid calendar date \
       {trimmed:?}: {err}"
    )
  })
}

#[must_use]
pub fn format_iso_date(
  date: NaiveDate
) -> String {
  date.format(ISO_DATE_FORMAT).to_string()
}

/// Formats a deadline for display with a
/// chrono pattern. The pattern must already
/// be known to parse (`Renderer::new` checks it).
#[must_use]
pub fn format_deadline(
  date: NaiveDate,
  pattern: &str
) -> String {
  date.format(pattern).to_string()
}

#[must_use]
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

pub mod iso_date_serde {
  use chrono::NaiveDate;
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    date: &NaiveDate,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &super::format_iso_date(*date)
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    super::parse_iso_date(&raw)
      .map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    format_deadline,
    format_iso_date,
    parse_iso_date
  };

  #[test]
  fn parses_iso_date() {
    let parsed =
      parse_iso_date(" 2024-01-31 ")
        .expect("parse date");
    assert_eq!(
      parsed,
      NaiveDate::from_ymd_opt(
        2024, 1, 31
      )
      .expect("valid date")
    );
    assert_eq!(
      format_iso_date(parsed),
      "2024-01-31"
    );
  }

  #[test]
  fn rejects_loose_or_impossible_dates()
  {
    assert!(
      parse_iso_date("2024-1-1").is_err()
    );
    assert!(
      parse_iso_date("2024-02-30")
        .is_err()
    );
    assert!(
      parse_iso_date("tomorrow").is_err()
    );
    assert!(parse_iso_date("").is_err());
  }

  #[test]
  fn formats_for_display() {
    let date = NaiveDate::from_ymd_opt(
      2025, 3, 7
    )
    .expect("valid date");
    assert_eq!(
      format_deadline(
        date,
        super::DEFAULT_DISPLAY_FORMAT
      ),
      "07.03.2025"
    );
  }
}
