//! Health reporting for the networked backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Backend is reachable and responsive
    Healthy,
    /// Backend is reachable but slow (above degraded threshold)
    Degraded,
    /// Backend is not reachable or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Result of pinging the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Overall health status
    pub status: HealthStatus,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Timestamp of the health check
    pub timestamp: DateTime<Utc>,
    /// Error message (if unhealthy)
    pub error: Option<String>,
}

impl HealthCheckResult {
    /// Create a result for a successful ping
    pub(crate) fn healthy(response_time: Duration, degraded_threshold: Duration) -> Self {
        let status = if response_time > degraded_threshold {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            response_time_ms: response_time.as_millis() as u64,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Create an unhealthy result
    pub(crate) fn unhealthy(response_time: Duration, error: &str) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_operational() {
        assert!(HealthStatus::Healthy.is_operational());
        assert!(HealthStatus::Degraded.is_operational());
        assert!(!HealthStatus::Unhealthy.is_operational());
    }

    #[test]
    fn test_health_check_result_healthy() {
        let result =
            HealthCheckResult::healthy(Duration::from_millis(5), Duration::from_millis(250));

        assert_eq!(result.status, HealthStatus::Healthy);
        assert_eq!(result.response_time_ms, 5);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_health_check_result_degraded() {
        let result =
            HealthCheckResult::healthy(Duration::from_millis(400), Duration::from_millis(250));

        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.response_time_ms, 400);
    }

    #[test]
    fn test_health_check_result_unhealthy() {
        let result = HealthCheckResult::unhealthy(Duration::from_millis(100), "Connection refused");

        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert_eq!(result.error.as_deref(), Some("Connection refused"));
    }

    #[test]
    fn test_health_check_result_serialization() {
        let json_str = r#"{
            "status": "Degraded",
            "response_time_ms": 42,
            "timestamp": "2026-02-03T12:00:00Z",
            "error": null
        }"#;

        let result: HealthCheckResult = serde_json::from_str(json_str).unwrap();
        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.response_time_ms, 42);
    }
}
