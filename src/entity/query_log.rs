//! Observed search events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One search as it was issued by a user.
///
/// `query_string` is of the form `field:value [AND field:value]*`; the optional
/// `filter_query_string` uses the same form and supplies tags and roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLog {
    pub query_string: String,
    #[serde(default)]
    pub filter_query_string: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl QueryLog {
    pub fn new<S: Into<String>>(query_string: S) -> Self {
        QueryLog {
            query_string: query_string.into(),
            filter_query_string: None,
            user: None,
            session: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_filter_query<S: Into<String>>(mut self, filter_query: S) -> Self {
        self.filter_query_string = Some(filter_query.into());
        self
    }

    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_session<S: Into<String>>(mut self, session: S) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
