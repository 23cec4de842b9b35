//! Peripheral page behaviors: the scripted advisor demo log, the
//! one-shot reveal set, and the footer year. None of this touches the GPU.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEMO_LINES: [&str; 6] = [
    "[advisor] initializing…",
    "[sensors] cpu 7% | gpu 4% | mem 42% | disk 68% | net idle",
    "[analysis] background apps detected: 3",
    "[tip] disable startup item: Widgets.exe (impact: medium)",
    "[tip] schedule trim for SSD C: (last run 21d ago)",
    "[status] overall: healthy",
];

pub const DEMO_LINE_INTERVAL: Duration = Duration::from_millis(550);

/// The advisor demo: restarting clears the transcript and replays the
/// scripted lines on a fixed cadence.
#[derive(Default)]
pub struct DemoLog {
    visible: usize,
    since_last: Duration,
    running: bool,
}

impl DemoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the transcript and starts the replay from the top. The first
    /// line appears one full interval later, not immediately.
    pub fn restart(&mut self) {
        self.visible = 0;
        self.since_last = Duration::ZERO;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn visible_lines(&self) -> &[&'static str] {
        &DEMO_LINES[..self.visible]
    }

    /// Advances the replay clock and returns the lines newly revealed this
    /// tick. A large `dt` can reveal several at once.
    pub fn advance(&mut self, dt: Duration) -> &[&'static str] {
        if !self.running {
            return &[];
        }
        let before = self.visible;
        self.since_last += dt;
        while self.since_last >= DEMO_LINE_INTERVAL && self.visible < DEMO_LINES.len() {
            self.since_last -= DEMO_LINE_INTERVAL;
            self.visible += 1;
        }
        if self.visible == DEMO_LINES.len() {
            self.running = false;
        }
        &DEMO_LINES[before..self.visible]
    }
}

/// Tracks one-shot reveals by key. The first mark wins; re-marking an
/// already revealed key reports nothing.
#[derive(Default)]
pub struct RevealSet {
    revealed: BTreeSet<&'static str>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, key: &'static str) -> bool {
        self.revealed.insert(key)
    }

    pub fn is_revealed(&self, key: &str) -> bool {
        self.revealed.contains(key)
    }
}

/// Current calendar year for the footer line. Uses the days-from-epoch
/// civil calendar conversion, so no date crate is needed for one field.
pub fn footer_year() -> i64 {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    year_of_unix_days(secs as i64 / 86_400)
}

fn year_of_unix_days(days: i64) -> i64 {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let month = (5 * doy + 2) / 153;
    if month >= 10 { year + 1 } else { year }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_reveals_one_line_per_interval() {
        let mut demo = DemoLog::new();
        demo.restart();
        assert!(demo.advance(Duration::from_millis(549)).is_empty());
        assert_eq!(demo.advance(Duration::from_millis(1)), &[DEMO_LINES[0]]);
        assert_eq!(demo.visible_lines().len(), 1);
        assert_eq!(demo.advance(DEMO_LINE_INTERVAL), &[DEMO_LINES[1]]);
    }

    #[test]
    fn demo_catches_up_after_a_long_tick() {
        let mut demo = DemoLog::new();
        demo.restart();
        let revealed = demo.advance(DEMO_LINE_INTERVAL * 3);
        assert_eq!(revealed, &DEMO_LINES[..3]);
    }

    #[test]
    fn demo_stops_after_the_last_line() {
        let mut demo = DemoLog::new();
        demo.restart();
        demo.advance(DEMO_LINE_INTERVAL * 10);
        assert_eq!(demo.visible_lines(), &DEMO_LINES[..]);
        assert!(!demo.is_running());
        assert!(demo.advance(DEMO_LINE_INTERVAL).is_empty());
    }

    #[test]
    fn restart_clears_the_transcript() {
        let mut demo = DemoLog::new();
        demo.restart();
        demo.advance(DEMO_LINE_INTERVAL * 2);
        demo.restart();
        assert!(demo.visible_lines().is_empty());
        assert!(demo.is_running());
    }

    #[test]
    fn reveal_marks_each_key_once() {
        let mut reveals = RevealSet::new();
        assert!(reveals.mark("hero"));
        assert!(!reveals.mark("hero"));
        assert!(reveals.is_revealed("hero"));
        assert!(!reveals.is_revealed("footer"));
    }

    #[test]
    fn year_conversion_hits_known_dates() {
        // 2000-01-01 and 2023-12-31 in days since the Unix epoch.
        assert_eq!(year_of_unix_days(10_957), 2000);
        assert_eq!(year_of_unix_days(19_722), 2023);
        assert_eq!(year_of_unix_days(0), 1970);
    }

    #[test]
    fn footer_year_is_plausible() {
        let year = footer_year();
        assert!((2024..2200).contains(&year));
    }
}
