//! Turn search hits into detected events and key moments.

use scout_models::{Event, EventType, KeyMoment, TimeRange};

/// Hits must score strictly above this (0-100 scale) to count as detections.
pub const DETECTION_THRESHOLD: f64 = 70.0;

/// Key moments kept per report.
pub const MAX_KEY_MOMENTS: usize = 10;

/// Accumulates events and key moments across queries.
#[derive(Debug, Default)]
pub struct Detections {
    pub events: Vec<Event>,
    pub key_moments: Vec<KeyMoment>,
}

impl Detections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the hits of one query into the detection set.
    ///
    /// Every clip of a retained hit becomes an event carrying the hit's
    /// confidence. Hits without a video id are attributed to `asset_id`.
    pub fn absorb(
        &mut self,
        hits: &[crate::types::SearchHit],
        event_type: EventType,
        keyword: &str,
        player_name: &str,
        asset_id: &str,
    ) {
        for hit in hits.iter().filter(|h| h.score > DETECTION_THRESHOLD) {
            let confidence = hit.confidence();
            let video_id = hit.video_id.as_deref().unwrap_or(asset_id);
            for clip in &hit.clips {
                let range = TimeRange::from_secs_f64(clip.start, clip.end);
                let mut event = Event::new(
                    event_type,
                    range,
                    confidence,
                    format!("{} - {}", player_name, keyword),
                    video_id,
                );
                if let Some(clip_id) = &clip.clip_id {
                    event = event.with_clip_id(clip_id.clone());
                }
                self.events.push(event);
                self.key_moments.push(KeyMoment {
                    time: range.start(),
                    description: keyword.to_string(),
                    importance: confidence,
                    event_type,
                });
            }
        }
    }

    /// Key moments by importance, highest first, capped.
    pub fn top_key_moments(&self) -> Vec<KeyMoment> {
        let mut moments = self.key_moments.clone();
        moments.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        moments.truncate(MAX_KEY_MOMENTS);
        moments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HitClip, SearchHit};

    fn hit(score: f64, clips: &[(f64, f64)]) -> SearchHit {
        SearchHit {
            score,
            video_id: None,
            clips: clips
                .iter()
                .map(|(s, e)| HitClip {
                    start: *s,
                    end: *e,
                    clip_id: None,
                    thumbnail_url: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut d = Detections::new();
        d.absorb(
            &[hit(70.0, &[(1.0, 2.0)]), hit(70.5, &[(3.0, 4.0)])],
            EventType::Goal,
            "goal",
            "Test Player",
            "asset-1",
        );
        assert_eq!(d.events.len(), 1);
        assert_eq!(d.events[0].start(), 3);
        assert_eq!(d.events[0].description, "Test Player - goal");
        assert_eq!(d.events[0].source_video_id, "asset-1");
    }

    #[test]
    fn test_each_clip_is_an_event() {
        let mut d = Detections::new();
        d.absorb(
            &[hit(88.0, &[(10.4, 15.6), (40.0, 44.0)])],
            EventType::Pass,
            "pass",
            "P",
            "a",
        );
        assert_eq!(d.events.len(), 2);
        assert_eq!(d.events[0].time_range, TimeRange::new(10, 16).unwrap());
        assert!((d.events[1].confidence - 0.88).abs() < 1e-9);
        assert_eq!(d.key_moments.len(), 2);
        assert_eq!(d.key_moments[0].description, "pass");
    }

    #[test]
    fn test_top_key_moments_sorted_and_capped() {
        let mut d = Detections::new();
        let hits: Vec<SearchHit> = (0..15).map(|i| hit(71.0 + i as f64, &[(i as f64, i as f64 + 1.0)])).collect();
        d.absorb(&hits, EventType::Shot, "shot", "P", "a");

        let top = d.top_key_moments();
        assert_eq!(top.len(), MAX_KEY_MOMENTS);
        assert_eq!(top[0].time, 14);
        assert!(top.windows(2).all(|w| w[0].importance >= w[1].importance));
    }
}
