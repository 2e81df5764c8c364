//! Metric generators for dashboard updates

use rand::Rng;

use crate::types::Metrics;

/// Produces the metric snapshot carried by each update
pub trait MetricSource: Send + Sync {
    /// Snapshot for an on-demand update
    fn snapshot(&self) -> Metrics;

    /// Snapshot for a heartbeat, which also reports weather alerts
    fn heartbeat_snapshot(&self) -> Metrics;
}

/// Simulated telemetry drawn uniformly from fixed ranges:
/// health 80..100, incidents 1..11, demand 70..100, alerts 0..5
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMetrics;

impl MetricSource for RandomMetrics {
    fn snapshot(&self) -> Metrics {
        let mut rng = rand::rng();
        Metrics {
            system_health: rng.random_range(80..100),
            active_incidents: rng.random_range(1..11),
            energy_demand: rng.random_range(70..100),
            weather_alerts: None,
        }
    }

    fn heartbeat_snapshot(&self) -> Metrics {
        let mut metrics = self.snapshot();
        metrics.weather_alerts = Some(rand::rng().random_range(0..5));
        metrics
    }
}

/// Always returns the same snapshot
#[derive(Debug, Clone)]
pub struct FixedMetrics(pub Metrics);

impl MetricSource for FixedMetrics {
    fn snapshot(&self) -> Metrics {
        Metrics {
            weather_alerts: None,
            ..self.0.clone()
        }
    }

    fn heartbeat_snapshot(&self) -> Metrics {
        Metrics {
            weather_alerts: Some(self.0.weather_alerts.unwrap_or(0)),
            ..self.0.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_metrics_within_ranges() {
        let source = RandomMetrics;
        for _ in 0..500 {
            let m = source.heartbeat_snapshot();
            assert!((80..100).contains(&m.system_health));
            assert!((1..11).contains(&m.active_incidents));
            assert!((70..100).contains(&m.energy_demand));
            assert!(m.weather_alerts.unwrap() < 5);
        }
    }

    #[test]
    fn test_on_demand_snapshot_has_no_alerts() {
        assert!(RandomMetrics.snapshot().weather_alerts.is_none());
    }

    #[test]
    fn test_fixed_metrics() {
        let source = FixedMetrics(Metrics {
            system_health: 95,
            active_incidents: 2,
            energy_demand: 80,
            weather_alerts: Some(4),
        });
        assert_eq!(source.snapshot().weather_alerts, None);
        assert_eq!(source.heartbeat_snapshot().weather_alerts, Some(4));
        assert_eq!(source.snapshot().system_health, 95);
    }
}
