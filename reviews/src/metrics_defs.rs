//! Metrics definitions for the review service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REVIEWS_CREATED: MetricDef = MetricDef {
    name: "reviews.created",
    metric_type: MetricType::Counter,
    description: "Number of reviews accepted and appended to the store",
};

pub const REVIEWS_REJECTED: MetricDef = MetricDef {
    name: "reviews.rejected",
    metric_type: MetricType::Counter,
    description: "Number of review submissions rejected by validation, tagged by reason",
};

pub const REVIEWS_RETURNED: MetricDef = MetricDef {
    name: "reviews.query.returned",
    metric_type: MetricType::Histogram,
    description: "Number of reviews returned by a read request",
};

pub const REVIEWS_STORED: MetricDef = MetricDef {
    name: "reviews.stored",
    metric_type: MetricType::Gauge,
    description: "Number of reviews currently held in memory",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "reviews.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to handle a request in seconds, tagged by method and status",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REVIEWS_CREATED,
    REVIEWS_REJECTED,
    REVIEWS_RETURNED,
    REVIEWS_STORED,
    REQUEST_DURATION,
];
