use crate::locations::LocationAllowList;
use crate::types::AnnotatedReview;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("invalid {param}")]
    MalformedDate { param: &'static str, value: String },
}

/// Decodes form-urlencoded input, keeping the first non-blank value of each key.
pub(crate) fn parse_form(input: &[u8]) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        if value.is_empty() {
            continue;
        }
        fields
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    fields
}

/// Optional read-time criteria. Absent criteria do not restrict the result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewQuery {
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReviewQuery {
    /// Parses `location`, `start_date` and `end_date` from a raw query string.
    /// Any unparseable date fails the whole query.
    pub fn from_query_string(query: Option<&str>) -> Result<Self, QueryError> {
        let mut fields = parse_form(query.unwrap_or_default().as_bytes());

        Ok(ReviewQuery {
            location: fields.remove("location"),
            start_date: parse_date("start_date", fields.remove("start_date"))?,
            end_date: parse_date("end_date", fields.remove("end_date"))?,
        })
    }

    /// Keeps the reviews matching every present criterion, preserving input order.
    ///
    /// Both date bounds compare against midnight of the given day, so a review
    /// written later on `end_date` itself falls outside the range.
    pub fn filter(
        &self,
        reviews: Vec<AnnotatedReview>,
        allow_list: &LocationAllowList,
    ) -> Vec<AnnotatedReview> {
        if let Some(location) = &self.location
            && !allow_list.contains(location)
        {
            return Vec::new();
        }

        let start = self.start_date.map(midnight);
        let end = self.end_date.map(midnight);

        reviews
            .into_iter()
            .filter(|annotated| {
                let review = &annotated.review;
                self.location
                    .as_ref()
                    .is_none_or(|location| review.location == *location)
                    && start.is_none_or(|start| review.timestamp >= start)
                    && end.is_none_or(|end| review.timestamp <= end)
            })
            .collect()
    }
}

fn parse_date(param: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, QueryError> {
    value
        .map(|value| {
            NaiveDate::parse_from_str(&value, DATE_FORMAT)
                .map_err(|_| QueryError::MalformedDate { param, value })
        })
        .transpose()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
