use crate::collector::Collector;
use chrono::{NaiveDate, Utc};
use log::debug;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// Keeps the collector resident, rerunning it every `period` for the
/// current UTC day. The first run happens before `run` is called.
pub struct PeriodicRefresher {
    collector: Collector,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(collector: Collector, period: Duration) -> Self {
        Self { collector, period }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick; the caller has just collected.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            let today = today_utc();
            debug!("scheduled collection for {today}");
            // Failures are already logged and alerted; the next tick retries.
            let _ = self.collector.run(today).await;
        }
    }
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
