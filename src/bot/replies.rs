use crate::bot::commands::BotCommand;
use livescore_api::{MatchView, Schedule, classify};

const MAX_ROWS: usize = 10;

pub const START_TEXT: &str =
    "Welcome to Goal2Gol ⚽\nUse /live for live scores, /matches for fixtures, /help for help.";

pub const HELP_TEXT: &str = "/start – Start the bot\n\
     /live – Live football scores\n\
     /matches – Today’s fixtures\n\
     /help – This help";

pub const NOT_READY_TEXT: &str = "Match data is not ready yet.";

/// `Home 2-1 Away (FT)`; the score collapses to a dash unless both sides have one.
pub fn fmt_row(view: &MatchView) -> String {
    let score = match (view.home_score, view.away_score) {
        (Some(home), Some(away)) => format!("{home}-{away}"),
        _ => "–".to_owned(),
    };
    format!(
        "{} {score} {} ({})",
        view.home_team_name,
        view.away_team_name,
        view.status_label()
    )
}

fn listing(header: &str, empty: &str, views: &[MatchView]) -> String {
    if views.is_empty() {
        return empty.to_owned();
    }
    let rows: Vec<String> = views.iter().take(MAX_ROWS).map(fmt_row).collect();
    format!("{header}\n{}", rows.join("\n"))
}

/// Reply text for a command. Data commands need a snapshot.
pub fn reply(command: BotCommand, schedule: Option<&Schedule>) -> String {
    match command {
        BotCommand::Start => START_TEXT.to_owned(),
        BotCommand::Help => HELP_TEXT.to_owned(),
        BotCommand::Live | BotCommand::Matches => {
            let Some(schedule) = schedule else {
                return NOT_READY_TEXT.to_owned();
            };
            let classification = classify(schedule);
            if command == BotCommand::Live {
                listing("Live Scores:", "No live matches right now.", &classification.live)
            } else {
                listing(
                    "Today’s Fixtures:",
                    "No fixtures available right now.",
                    &classification.upcoming,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livescore_api::{Event, MatchStatus, Stage};

    fn schedule(events: Vec<Event>) -> Schedule {
        Schedule::new(vec![Stage::new("S1", "Premier League").with_events(events)])
    }

    #[test]
    fn rows_show_score_only_when_both_sides_have_one() {
        let s = schedule(vec![
            Event::new("1", MatchStatus::from_token("2H")).with_teams("Arsenal", "Chelsea").with_score(2, 1),
            Event::new("2", MatchStatus::NotStarted).with_teams("Spurs", "Leeds"),
        ]);
        let views = classify(&s).all;
        assert_eq!(fmt_row(&views[0]), "Arsenal 2-1 Chelsea (2H)");
        assert_eq!(fmt_row(&views[1]), "Spurs – Leeds (NS)");
    }

    #[test]
    fn live_reply_lists_live_events() {
        let s = schedule(vec![
            Event::new("1", MatchStatus::from_token("HT")).with_teams("A", "B").with_score(0, 0),
            Event::new("2", MatchStatus::FullTime).with_teams("C", "D").with_score(1, 0),
        ]);
        assert_eq!(reply(BotCommand::Live, Some(&s)), "Live Scores:\nA 0-0 B (HT)");
    }

    #[test]
    fn replies_are_capped_at_ten_rows() {
        let events = (0..15)
            .map(|i| Event::new(i.to_string(), MatchStatus::NotStarted).with_teams("H", "A"))
            .collect();
        let text = reply(BotCommand::Matches, Some(&schedule(events)));
        assert!(text.starts_with("Today’s Fixtures:\n"));
        assert_eq!(text.lines().count(), 11);
    }

    #[test]
    fn empty_listings_have_their_own_text() {
        let s = schedule(vec![Event::new("1", MatchStatus::FullTime)]);
        assert_eq!(reply(BotCommand::Live, Some(&s)), "No live matches right now.");
        assert_eq!(reply(BotCommand::Matches, Some(&s)), "No fixtures available right now.");
    }

    #[test]
    fn data_commands_need_a_snapshot() {
        assert_eq!(reply(BotCommand::Live, None), NOT_READY_TEXT);
        assert_eq!(reply(BotCommand::Matches, None), NOT_READY_TEXT);
        assert_eq!(reply(BotCommand::Start, None), START_TEXT);
        assert!(reply(BotCommand::Help, None).contains("/matches"));
    }
}
