use thiserror::Error;

/// Which upstream call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Conditions,
    Alerts,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Conditions => "weather",
            Endpoint::Alerts => "Weather alerts",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single upstream fetch. These are returned as values and never
/// abort the inbound request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not fetch {endpoint} - {code}")]
    Status { endpoint: Endpoint, code: u16 },

    #[error("Error parsing Weather JSON response object")]
    Shape {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not fetch {endpoint} - {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchError::Status { endpoint, .. }
            | FetchError::Shape { endpoint, .. }
            | FetchError::Transport { endpoint, .. } => *endpoint,
        }
    }
}
