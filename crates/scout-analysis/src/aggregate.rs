//! Aggregate performance metrics over detected events.

use scout_models::{Event, PerformanceMetrics};

/// Event count at which intensity saturates.
const INTENSITY_SATURATION: f64 = 20.0;

/// Events above this confidence count toward technical quality.
const HIGH_CONFIDENCE: f64 = 0.8;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean confidence, saturating event density and share of high-confidence events.
pub fn aggregate_metrics(events: &[Event]) -> PerformanceMetrics {
    if events.is_empty() {
        return PerformanceMetrics::default();
    }

    let count = events.len() as f64;
    let mean_confidence = events.iter().map(|e| e.confidence).sum::<f64>() / count;
    let intensity = (count / INTENSITY_SATURATION).min(1.0);
    let high = events.iter().filter(|e| e.confidence > HIGH_CONFIDENCE).count() as f64;

    PerformanceMetrics {
        success_rate: round2(mean_confidence),
        intensity: round2(intensity),
        technical_quality: round2(high / count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_models::{EventType, TimeRange};

    fn event(confidence: f64) -> Event {
        Event::new(EventType::Pass, TimeRange::new(0, 5).unwrap(), confidence, "", "a")
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(aggregate_metrics(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn test_metrics_rounded() {
        let events = vec![event(0.9), event(0.75), event(0.81)];
        let m = aggregate_metrics(&events);
        assert_eq!(m.success_rate, 0.82);
        assert_eq!(m.intensity, 0.15);
        assert_eq!(m.technical_quality, 0.67);
    }

    #[test]
    fn test_intensity_saturates() {
        let events: Vec<Event> = (0..30).map(|_| event(0.5)).collect();
        let m = aggregate_metrics(&events);
        assert_eq!(m.intensity, 1.0);
        assert_eq!(m.technical_quality, 0.0);
    }
}
