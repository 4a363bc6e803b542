use serde::{Deserialize, Serialize};

/// Account snapshot reported by the DataSetIQ API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub plan: String,
    pub status: String,
    pub quota: Quota,
}

/// Request quota for the current billing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub used: f64,
    pub limit: f64,
    /// Reset moment as reported by the server (opaque display string)
    pub reset: String,
}

impl Quota {
    /// Requests left before the limit, never negative
    pub fn remaining(&self) -> f64 {
        (self.limit - self.used).max(0.0)
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} (resets {})", self.used, self.limit, self.reset)
    }
}
