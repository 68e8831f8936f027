use crate::errors::{Result, ReviewsError, ValidationError};
use crate::locations::LocationAllowList;
use crate::metrics_defs::{
    REQUEST_DURATION, REVIEWS_CREATED, REVIEWS_REJECTED, REVIEWS_RETURNED, REVIEWS_STORED,
};
use crate::query::{ReviewQuery, parse_form};
use crate::ranker::rank;
use crate::sentiment::{SentimentAnnotator, SentimentScorer};
use crate::store::ReviewStore;
use crate::types::Review;
use chrono::{Local, SubsecRound};
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use shared::{counter, gauge, histogram};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Handles review reads and writes over plain `http` request/response values,
/// independent of the server driving it.
#[derive(Clone)]
pub struct ReviewHandler {
    store: ReviewStore,
    allow_list: Arc<LocationAllowList>,
    annotator: SentimentAnnotator,
}

impl ReviewHandler {
    pub fn new(
        store: ReviewStore,
        allow_list: LocationAllowList,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            store,
            allow_list: Arc::new(allow_list),
            annotator: SentimentAnnotator::new(scorer),
        }
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let started = Instant::now();
        let method = request.method().clone();

        let result = match method {
            Method::GET => self.list_reviews(request.uri().query()),
            Method::POST => self.create_review(request.body()),
            _ => Err(ReviewsError::MethodNotAllowed(method.clone())),
        };

        let response = result.unwrap_or_else(|err| {
            if err.status_code().is_server_error() {
                tracing::error!(method = %method, error = %err, "request failed");
            } else {
                tracing::debug!(method = %method, error = ?err, "request rejected");
            }
            err.into_response()
        });

        histogram!(
            REQUEST_DURATION,
            "method" => method.to_string(),
            "status" => response.status().as_str().to_owned(),
        )
        .record(started.elapsed().as_secs_f64());

        response
    }

    /// Every stored review matching the query, annotated and ranked by sentiment.
    pub fn list_reviews(&self, query: Option<&str>) -> Result<Response<Bytes>> {
        let query = ReviewQuery::from_query_string(query)?;

        let annotated = self.annotator.annotate_all(self.store.all())?;
        let reviews = rank(query.filter(annotated, &self.allow_list));

        tracing::debug!(?query, returned = reviews.len(), "listing reviews");
        histogram!(REVIEWS_RETURNED).record(reviews.len() as f64);

        json_response(StatusCode::OK, &reviews)
    }

    /// Validates a form-encoded submission and appends the new review.
    pub fn create_review(&self, body: &[u8]) -> Result<Response<Bytes>> {
        let review = match self.validate(body) {
            Ok(review) => review,
            Err(err) => {
                counter!(REVIEWS_REJECTED, "reason" => err.reason()).increment(1);
                return Err(err.into());
            }
        };

        self.store.append(review.clone());
        counter!(REVIEWS_CREATED).increment(1);
        gauge!(REVIEWS_STORED).set(self.store.len() as f64);
        tracing::info!(review_id = %review.id, location = %review.location, "review created");

        json_response(StatusCode::CREATED, &review)
    }

    fn validate(&self, body: &[u8]) -> Result<Review, ValidationError> {
        let mut fields = parse_form(body);

        let location = fields
            .remove("Location")
            .ok_or(ValidationError::MissingLocation)?;
        let review_body = fields
            .remove("ReviewBody")
            .ok_or(ValidationError::MissingReviewBody)?;
        if !self.allow_list.contains(&location) {
            return Err(ValidationError::InvalidLocation);
        }

        Ok(Review::new(
            Uuid::new_v4().to_string(),
            review_body,
            location,
            Local::now().naive_local().trunc_subsecs(0),
        ))
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Bytes>> {
    let body = serde_json::to_vec_pretty(value)?;

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(Bytes::from(body))
        .map_err(|e| ReviewsError::InternalError(format!("Failed to build response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{FailingScorer, FixedScorer, timestamp};
    use crate::types::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde_json::Value;
    use std::collections::HashSet;

    fn seeded_handler() -> ReviewHandler {
        let store = ReviewStore::new();
        for (id, body, location, ts) in [
            ("1", "meh", "Denver, Colorado", "2022-12-31 22:00:00"),
            ("2", "great", "Denver, Colorado", "2023-01-05 10:00:00"),
            ("3", "awful", "Tucson, Arizona", "2023-01-20 15:30:00"),
            ("4", "fine", "Denver, Colorado", "2023-01-31 09:00:00"),
            ("5", "lovely", "Tucson, Arizona", "2023-02-01 00:00:00"),
        ] {
            store.append(Review::new(id, body, location, timestamp(ts)));
        }

        let scorer = FixedScorer::new([
            ("great", 0.9),
            ("awful", -0.8),
            ("fine", 0.3),
            ("lovely", 0.6),
            ("meh", 0.0),
        ]);
        ReviewHandler::new(store, LocationAllowList::default(), Arc::new(scorer))
    }

    fn get(handler: &ReviewHandler, uri: &str) -> Response<Bytes> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        handler.handle(request)
    }

    fn post(handler: &ReviewHandler, form: &str) -> Response<Bytes> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Bytes::from(form.to_owned()))
            .unwrap();
        handler.handle(request)
    }

    fn json(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn ids(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["ReviewId"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_get_all_sorted_by_compound() {
        let handler = seeded_handler();
        let response = get(&handler, "/");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = json(&response);
        assert_eq!(ids(&body), vec!["2", "5", "4", "1", "3"]);

        let compounds: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["sentiment"]["compound"].as_f64().unwrap())
            .collect();
        assert!(compounds.iter().all(|c| (-1.0..=1.0).contains(c)));
        assert!(compounds.windows(2).all(|w| w[0] >= w[1]));

        let first = &body[0];
        assert_eq!(first["ReviewBody"], "great");
        assert_eq!(first["Location"], "Denver, Colorado");
        assert_eq!(first["Timestamp"], "2023-01-05 10:00:00");
        for key in ["neg", "neu", "pos", "compound"] {
            assert!(first["sentiment"][key].is_f64(), "missing {key}");
        }
    }

    #[test]
    fn test_get_by_location() {
        let handler = seeded_handler();

        let body = json(&get(&handler, "/?location=Denver%2C%20Colorado"));
        assert_eq!(ids(&body), vec!["2", "4", "1"]);

        let body = json(&get(&handler, "/?location=Nowhere"));
        assert_eq!(body, Value::Array(vec![]));
    }

    #[test]
    fn test_get_by_date_range() {
        let handler = seeded_handler();

        let body = json(&get(&handler, "/?start_date=2023-01-01&end_date=2023-01-31"));
        // Review 4 was written on the end date after midnight and is excluded.
        assert_eq!(ids(&body), vec!["2", "3"]);

        let body = json(&get(&handler, "/?start_date=2023-01-25"));
        assert_eq!(ids(&body), vec!["5", "4"]);

        let body = json(&get(
            &handler,
            "/?location=Tucson%2C+Arizona&end_date=2023-02-01",
        ));
        assert_eq!(ids(&body), vec!["5", "3"]);
    }

    #[test]
    fn test_get_malformed_date_is_client_error() {
        let handler = seeded_handler();

        let response = get(&handler, "/?start_date=yesterday");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body().as_ref(), b"invalid start_date");

        let response = get(&handler, "/?start_date=2023-01-01&end_date=2023-13-01");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body().as_ref(), b"invalid end_date");
    }

    #[test]
    fn test_get_scorer_failure_is_server_error() {
        let store = ReviewStore::new();
        store.append(Review::new(
            "1",
            "text",
            "Denver, Colorado",
            timestamp("2023-01-01 00:00:00"),
        ));
        let handler =
            ReviewHandler::new(store, LocationAllowList::default(), Arc::new(FailingScorer));

        let response = get(&handler, "/");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_get_empty_store() {
        let handler = ReviewHandler::new(
            ReviewStore::new(),
            LocationAllowList::default(),
            Arc::new(FailingScorer),
        );
        let response = get(&handler, "/");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(&response), Value::Array(vec![]));
    }

    #[test]
    fn test_post_creates_review() {
        let handler = seeded_handler();
        let before = handler.store().len();

        let response = post(
            &handler,
            "Location=San+Diego%2C+California&ReviewBody=Fish+tacos+%26+horchata",
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = json(&response);
        assert_eq!(body["Location"], "San Diego, California");
        assert_eq!(body["ReviewBody"], "Fish tacos & horchata");
        assert!(body.get("sentiment").is_none());
        let ts = body["Timestamp"].as_str().unwrap();
        assert!(NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());

        let id = body["ReviewId"].as_str().unwrap();
        let stored = handler.store().all();
        assert_eq!(stored.len(), before + 1);
        assert_eq!(stored.last().unwrap().id, id);
    }

    #[test]
    fn test_post_ids_are_unique() {
        let handler = seeded_handler();
        let mut seen: HashSet<String> = handler.store().all().into_iter().map(|r| r.id).collect();

        for _ in 0..20 {
            let body = json(&post(&handler, "Location=Fresno%2C+California&ReviewBody=ok"));
            assert!(seen.insert(body["ReviewId"].as_str().unwrap().to_owned()));
        }
    }

    #[test]
    fn test_post_validation_order() {
        let handler = seeded_handler();
        let before = handler.store().len();

        for (form, message) in [
            ("ReviewBody=hello", "missing location"),
            ("", "missing location"),
            ("Location=&ReviewBody=hello", "missing location"),
            ("Location=Nowhere", "missing review body"),
            ("Location=Denver%2C+Colorado&ReviewBody=", "missing review body"),
            ("Location=Nowhere&ReviewBody=hello", "invalid location"),
            ("Location=denver%2C+colorado&ReviewBody=hello", "invalid location"),
        ] {
            let response = post(&handler, form);
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "form {form:?}");
            assert_eq!(response.body().as_ref(), message.as_bytes(), "form {form:?}");
        }

        assert_eq!(handler.store().len(), before);
    }

    #[test]
    fn test_post_then_get_round_trip() {
        let handler = seeded_handler();
        let created = json(&post(
            &handler,
            "Location=Las+Vegas%2C+Nevada&ReviewBody=great",
        ));

        let listed = json(&get(&handler, "/"));
        let matches: Vec<&Value> = listed
            .as_array()
            .unwrap()
            .iter()
            .filter(|r| r["ReviewId"] == created["ReviewId"])
            .collect();

        assert_eq!(matches.len(), 1);
        let fetched = matches[0];
        assert_eq!(fetched["Location"], created["Location"]);
        assert_eq!(fetched["ReviewBody"], created["ReviewBody"]);
        assert_eq!(fetched["Timestamp"], created["Timestamp"]);
        assert_eq!(fetched["sentiment"]["compound"], 0.9);
    }

    #[test]
    fn test_other_methods_rejected() {
        let handler = seeded_handler();
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/")
            .body(Bytes::new())
            .unwrap();
        let response = handler.handle(request);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
