use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::{Event, Schedule, Stage};

/// What happens when an event id is seen a second time.
///
/// Either way the event keeps the position of its first sighting; the
/// policy only decides whose *value* is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The first-seen value wins; later updates to the same id are ignored.
    KeepFirst,
    /// A later sighting overwrites the stored value, so a match that kicked
    /// off yesterday picks up today's score and status.
    #[default]
    KeepLatest,
}

impl MergePolicy {
    pub fn label(&self) -> &'static str {
        match self {
            MergePolicy::KeepFirst => "keep-first",
            MergePolicy::KeepLatest => "keep-latest",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "keep-first" | "first" => Ok(MergePolicy::KeepFirst),
            "keep-latest" | "latest" => Ok(MergePolicy::KeepLatest),
            other => Err(format!("unknown merge policy {other:?} (expected keep-first or keep-latest)")),
        }
    }
}

/// Merge `previous` (yesterday) and `current` (today) into one canonical
/// schedule. Total: never fails, and either side may be empty.
///
/// Yesterday's stages are walked before today's. The first time a stage key
/// is seen the stage claims its position in the output; later sightings only
/// contribute events whose id is not already present. Stages without a key
/// are dropped.
pub fn merge(previous: Schedule, current: Schedule, policy: MergePolicy) -> Schedule {
    let mut merger = Merger::new(policy);
    for stage in previous.stages.into_iter().chain(current.stages) {
        merger.absorb(stage);
    }
    let merged = merger.finish();
    debug!(
        "merged {} stages / {} events ({policy})",
        merged.stages.len(),
        merged.event_count()
    );
    merged
}

/// Insertion-ordered stage accumulator: stages in encounter order plus an
/// index from merge key to position.
struct Merger {
    policy: MergePolicy,
    stages: Vec<MergedStage>,
    index: HashMap<String, usize>,
}

struct MergedStage {
    stage: Stage,
    /// Event id → position in `stage.events`. Id-less events are not indexed.
    positions: HashMap<String, usize>,
    holds_unkeyed: bool,
}

impl Merger {
    fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            stages: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn absorb(&mut self, mut stage: Stage) {
        let Some(key) = stage.merge_key().map(str::to_owned) else {
            warn!(
                "dropping stage without Sid/Cid ({})",
                stage.name.as_deref().unwrap_or("unnamed")
            );
            return;
        };

        let events = std::mem::take(&mut stage.events);
        let (slot, first_sighting) = match self.index.get(&key) {
            Some(&slot) => (slot, false),
            None => {
                let slot = self.stages.len();
                self.index.insert(key, slot);
                self.stages.push(MergedStage {
                    stage,
                    positions: HashMap::new(),
                    holds_unkeyed: false,
                });
                (slot, true)
            }
        };

        let policy = self.policy;
        if let Some(merged) = self.stages.get_mut(slot) {
            // Id-less events cannot be matched, so a later sighting only
            // contributes them when the stage has none yet.
            let accept_unkeyed = first_sighting || !merged.holds_unkeyed;
            for event in events {
                merged.absorb(event, policy, accept_unkeyed);
            }
        }
    }

    fn finish(self) -> Schedule {
        Schedule::new(self.stages.into_iter().map(|m| m.stage).collect())
    }
}

impl MergedStage {
    fn absorb(&mut self, event: Event, policy: MergePolicy, accept_unkeyed: bool) {
        let Some(id) = event.id.clone() else {
            if accept_unkeyed {
                self.holds_unkeyed = true;
                self.stage.events.push(event);
            }
            return;
        };
        match self.positions.get(&id) {
            Some(&pos) => {
                if policy == MergePolicy::KeepLatest
                    && let Some(existing) = self.stage.events.get_mut(pos)
                {
                    *existing = event;
                }
            }
            None => {
                self.positions.insert(id, self.stage.events.len());
                self.stage.events.push(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;

    fn live(id: &str, token: &str) -> Event {
        Event::new(id, MatchStatus::from_token(token))
    }

    fn ids(stage: &Stage) -> Vec<&str> {
        stage.events.iter().filter_map(|e| e.id.as_deref()).collect()
    }

    fn yesterday_and_today() -> (Schedule, Schedule) {
        let yesterday = Schedule::new(vec![
            Stage::new("S1", "Premier League").with_events(vec![live("E1", "1H")]),
            Stage::new("S9", "Serie A").with_events(vec![live("E9", "FT").with_score(0, 0)]),
        ]);
        let today = Schedule::new(vec![
            Stage::new("S1", "Premier League").with_events(vec![
                live("E1", "FT").with_score(2, 1),
                live("E2", "NS"),
            ]),
            Stage::new("S2", "La Liga").with_events(vec![live("E3", "NS")]),
        ]);
        (yesterday, today)
    }

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!("keep-first".parse::<MergePolicy>(), Ok(MergePolicy::KeepFirst));
        assert_eq!("KEEP_LATEST".parse::<MergePolicy>(), Ok(MergePolicy::KeepLatest));
        assert_eq!("latest".parse::<MergePolicy>(), Ok(MergePolicy::KeepLatest));
        assert!("newest".parse::<MergePolicy>().is_err());
    }

    #[test]
    fn stages_keep_encounter_order_with_yesterday_first() {
        let (yesterday, today) = yesterday_and_today();
        let merged = merge(yesterday, today, MergePolicy::default());
        let keys: Vec<_> = merged.stages.iter().filter_map(|s| s.merge_key()).collect();
        assert_eq!(keys, vec!["S1", "S9", "S2"]);
    }

    #[test]
    fn cross_midnight_match_takes_todays_value_in_yesterdays_slot() {
        let (yesterday, today) = yesterday_and_today();
        let merged = merge(yesterday, today, MergePolicy::KeepLatest);
        let s1 = &merged.stages[0];
        assert_eq!(ids(s1), vec!["E1", "E2"]);
        assert_eq!(s1.events[0].status, Some(MatchStatus::FullTime));
        assert_eq!(s1.events[0].home_score, Some(2));
        assert_eq!(s1.events[0].away_score, Some(1));
        assert_eq!(s1.events[1].status, Some(MatchStatus::NotStarted));
    }

    #[test]
    fn keep_first_ignores_the_later_update() {
        let (yesterday, today) = yesterday_and_today();
        let merged = merge(yesterday, today, MergePolicy::KeepFirst);
        let s1 = &merged.stages[0];
        assert_eq!(ids(s1), vec!["E1", "E2"]);
        assert_eq!(s1.events[0].status, Some(MatchStatus::Other("1H".into())));
        assert_eq!(s1.events[0].home_score, None);
    }

    #[test]
    fn remerging_the_same_day_is_idempotent() {
        for policy in [MergePolicy::KeepFirst, MergePolicy::KeepLatest] {
            let (yesterday, today) = yesterday_and_today();
            let once = merge(yesterday, today.clone(), policy);
            let twice = merge(once.clone(), today, policy);
            assert_eq!(once, twice, "{policy}");
        }
    }

    #[test]
    fn merging_a_document_with_itself_adds_nothing() {
        let (yesterday, _) = yesterday_and_today();
        let merged = merge(yesterday.clone(), yesterday.clone(), MergePolicy::KeepFirst);
        assert_eq!(merged, yesterday);
    }

    #[test]
    fn every_keyed_event_appears_exactly_once() {
        let (yesterday, today) = yesterday_and_today();
        let merged = merge(yesterday, today, MergePolicy::default());
        let mut all: Vec<(String, String)> = merged
            .stages
            .iter()
            .flat_map(|s| {
                let key = s.merge_key().unwrap_or_default().to_owned();
                s.events
                    .iter()
                    .map(move |e| (key.clone(), e.id.clone().unwrap_or_default()))
            })
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, 4); // E1, E2, E9, E3
    }

    #[test]
    fn stages_without_any_id_are_dropped() {
        let nameless = Stage {
            name: Some("Mystery Cup".into()),
            events: vec![live("X1", "1H")],
            ..Default::default()
        };
        let merged = merge(
            Schedule::new(vec![nameless]),
            Schedule::new(vec![Stage::new("S1", "League")]),
            MergePolicy::default(),
        );
        assert_eq!(merged.stages.len(), 1);
        assert_eq!(merged.stages[0].merge_key(), Some("S1"));
    }

    #[test]
    fn competition_id_stands_in_for_a_missing_stage_id() {
        let by_cid = |event: &str| Stage {
            competition_id: Some("65".into()),
            events: vec![live(event, "NS")],
            ..Default::default()
        };
        let merged = merge(
            Schedule::new(vec![by_cid("A")]),
            Schedule::new(vec![by_cid("B")]),
            MergePolicy::default(),
        );
        assert_eq!(merged.stages.len(), 1);
        assert_eq!(ids(&merged.stages[0]), vec!["A", "B"]);
    }

    #[test]
    fn empty_inputs_give_an_empty_document() {
        let merged = merge(Schedule::default(), Schedule::default(), MergePolicy::default());
        assert_eq!(merged, Schedule::default());
    }

    #[test]
    fn stages_with_no_events_are_kept() {
        let merged = merge(
            Schedule::default(),
            Schedule::new(vec![Stage::new("S5", "Eredivisie")]),
            MergePolicy::default(),
        );
        assert_eq!(merged.stages.len(), 1);
        assert!(merged.stages[0].events.is_empty());
    }

    #[test]
    fn duplicate_ids_inside_one_stage_collapse() {
        let stage = Stage::new("S1", "League").with_events(vec![
            live("E1", "NS"),
            live("E1", "1H"),
            live("E2", "NS"),
        ]);
        let merged = merge(Schedule::new(vec![stage]), Schedule::default(), MergePolicy::KeepLatest);
        assert_eq!(ids(&merged.stages[0]), vec!["E1", "E2"]);
        assert_eq!(merged.stages[0].events[0].status, Some(MatchStatus::Other("1H".into())));
    }

    fn unkeyed(token: &str) -> Event {
        Event {
            status: Some(MatchStatus::from_token(token)),
            ..Default::default()
        }
    }

    #[test]
    fn id_less_events_of_a_new_stage_are_all_kept() {
        for policy in [MergePolicy::KeepFirst, MergePolicy::KeepLatest] {
            let stage = Stage::new("S1", "League").with_events(vec![
                unkeyed("1H").with_teams("A", "B"),
                unkeyed("NS").with_teams("C", "D"),
                live("E1", "NS"),
            ]);
            let merged = merge(Schedule::new(vec![stage.clone()]), Schedule::default(), policy);
            assert_eq!(merged.stages[0], stage, "{policy}");
        }
    }

    #[test]
    fn later_id_less_events_only_join_a_stage_without_any() {
        let bare = Stage::new("S1", "League").with_events(vec![live("E1", "NS")]);
        let with_unkeyed = Stage::new("S1", "League")
            .with_events(vec![unkeyed("1H").with_teams("A", "B"), unkeyed("2H").with_teams("C", "D")]);

        let merged = merge(
            Schedule::new(vec![bare]),
            Schedule::new(vec![with_unkeyed.clone()]),
            MergePolicy::KeepLatest,
        );
        assert_eq!(merged.stages[0].events.len(), 3);

        let again = merge(merged.clone(), Schedule::new(vec![with_unkeyed]), MergePolicy::KeepLatest);
        assert_eq!(again, merged);
    }

    #[test]
    fn first_sighting_keeps_the_stage_metadata() {
        let mut renamed = Stage::new("S1", "Premier League (today)");
        renamed.competition_id = Some("65".into());
        let merged = merge(
            Schedule::new(vec![Stage::new("S1", "Premier League")]),
            Schedule::new(vec![renamed]),
            MergePolicy::KeepLatest,
        );
        assert_eq!(merged.stages[0].name.as_deref(), Some("Premier League"));
        assert!(merged.stages[0].competition_id.is_none());
    }
}
