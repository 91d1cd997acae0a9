use anyhow::Context;
use livescore_api::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_FEEDS_JSON: &str = include_str!("../feeds.json");

/// Auxiliary feeds mirrored next to the schedules. Loaded from
/// `GOAL2GOL_FEEDS_JSON` when set, otherwise from the embedded catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedCatalog {
    /// team slug → fixture feed URL
    #[serde(default)]
    pub team_fixtures: BTreeMap<String, String>,
    /// league slug → fixture feed URL
    #[serde(default)]
    pub league_fixtures: BTreeMap<String, String>,
    /// league slug → TheSportsDB league id
    #[serde(default)]
    pub standings: BTreeMap<String, u32>,
}

impl FeedCatalog {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return serde_json::from_str(DEFAULT_FEEDS_JSON).context("invalid embedded feed catalog");
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read feed catalog {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid feed catalog json at {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.team_fixtures.len() + self.league_fixtures.len() + self.standings.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    SeasonFixtures,
    LeagueFixtures,
    Standings,
}

impl FeedKind {
    fn dir_name(&self) -> &'static str {
        match self {
            FeedKind::SeasonFixtures => "season_fixtures",
            FeedKind::LeagueFixtures => "league_fixtures",
            FeedKind::Standings => "standings",
        }
    }

    /// File stem for a user-supplied name. Team names are only lower-cased;
    /// league names also turn spaces into dashes. Anything that could
    /// escape the feed directory is refused.
    pub fn slug(&self, name: &str) -> Option<String> {
        let lowered = name.trim().to_lowercase();
        let slug = match self {
            FeedKind::SeasonFixtures => lowered,
            FeedKind::LeagueFixtures | FeedKind::Standings => lowered.replace(' ', "-"),
        };
        let unsafe_slug = slug.is_empty()
            || slug.contains(['/', '\\', '\0'])
            || slug.starts_with('.');
        (!unsafe_slug).then_some(slug)
    }
}

/// Mirrored feed documents under `{data_dir}/{kind}/{slug}.json`.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    data_dir: PathBuf,
}

impl MirrorStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, kind: FeedKind, name: &str) -> Option<PathBuf> {
        let slug = kind.slug(name)?;
        Some(self.data_dir.join(kind.dir_name()).join(format!("{slug}.json")))
    }

    pub fn save<T: Serialize + ?Sized>(&self, kind: FeedKind, name: &str, value: &T) -> anyhow::Result<()> {
        let path = self
            .path_for(kind, name)
            .with_context(|| format!("refusing to store feed under name {name:?}"))?;
        store::write_json(&path, value)?;
        Ok(())
    }

    /// `Ok(None)` for unknown or unsafe names as well as missing files.
    pub fn load(&self, kind: FeedKind, name: &str) -> Result<Option<Value>, StoreError> {
        match self.path_for(kind, name) {
            Some(path) => store::read_json(&path),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn embedded_catalog_parses() {
        let catalog = FeedCatalog::load(None).unwrap();
        assert!(catalog.team_fixtures.contains_key("arsenal"));
        assert_eq!(catalog.standings.get("premier-league"), Some(&4328));
        assert!(catalog.len() > 30);
    }

    #[test]
    fn catalog_file_overrides_the_embedded_one() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("feeds.json");
        std::fs::write(&path, r#"{"standings": {"mls": 4346}}"#).unwrap();
        let catalog = FeedCatalog::load(Some(&path)).unwrap();
        assert!(catalog.team_fixtures.is_empty());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn slugs_follow_the_per_kind_rules() {
        assert_eq!(FeedKind::SeasonFixtures.slug("Man-City"), Some("man-city".into()));
        assert_eq!(FeedKind::LeagueFixtures.slug("Premier League"), Some("premier-league".into()));
        assert_eq!(FeedKind::Standings.slug("La Liga"), Some("la-liga".into()));
        assert_eq!(FeedKind::SeasonFixtures.slug("nott'm-forest"), Some("nott'm-forest".into()));
    }

    #[test]
    fn path_escapes_are_refused() {
        for bad in ["../secrets", "a/b", "..", "", "  ", ".hidden", "x\\y"] {
            assert!(FeedKind::Standings.slug(bad).is_none(), "{bad:?}");
        }
    }

    #[test]
    fn mirror_round_trips_documents() {
        let temp = tempdir().unwrap();
        let mirror = MirrorStore::new(temp.path());
        mirror
            .save(FeedKind::LeagueFixtures, "serie-a", &json!([{"MatchNumber": 1}]))
            .unwrap();

        let loaded = mirror.load(FeedKind::LeagueFixtures, "Serie A").unwrap();
        assert_eq!(loaded, Some(json!([{"MatchNumber": 1}])));
        assert!(temp.path().join("league_fixtures/serie-a.json").exists());
        assert_eq!(mirror.load(FeedKind::Standings, "serie-a").unwrap(), None);
        assert_eq!(mirror.load(FeedKind::Standings, "../league_fixtures/serie-a").unwrap(), None);
    }
}
