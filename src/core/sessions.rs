use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// A named trading session in whole UTC hours, `[start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SessionWindow {
    pub fn new(name: &str, start_hour: u32, end_hour: u32) -> Self {
        Self {
            name: name.to_string(),
            start_hour,
            end_hour,
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // Wraps midnight (e.g. Sydney 21:00 - 06:00)
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    pub fn hours_label(&self) -> String {
        format!("{:02}:00 - {:02}:00 UTC", self.start_hour, self.end_hour)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub name: String,
    pub status: String,
    pub hours: String,
}

/// All sessions open at `utc_now` (defaults to now), in config order.
/// When none is open a single "Inter-session" placeholder is returned.
pub fn active_sessions(cfg: &Config, utc_now: Option<DateTime<Utc>>) -> Vec<ActiveSession> {
    let hour = utc_now.unwrap_or_else(Utc::now).hour();

    let active: Vec<ActiveSession> = cfg
        .sessions
        .iter()
        .filter(|s| s.contains(hour))
        .map(|s| ActiveSession {
            name: s.name.clone(),
            status: "active".to_string(),
            hours: s.hours_label(),
        })
        .collect();

    if active.is_empty() {
        return vec![ActiveSession {
            name: "Inter-session".to_string(),
            status: "transitioning".to_string(),
            hours: "Between sessions".to_string(),
        }];
    }
    active
}
