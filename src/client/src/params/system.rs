use crate::filters::Filters;

/// `GET /events`. Without `until` the daemon keeps the stream open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetEventsParams {
    pub(crate) since: Option<i64>,
    pub(crate) until: Option<i64>,
    pub(crate) filters: Option<Filters>,
}

impl GetEventsParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unix seconds.
    pub fn with_since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    /// Unix seconds.
    pub fn with_until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }
}
