#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Live,
    Matches,
}

impl BotCommand {
    /// Parse the leading `/command` of a message, accepting the
    /// `/command@botname` form used in group chats. Arguments are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = word.split_once('@').map_or(word, |(name, _)| name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "live" => Some(Self::Live),
            "matches" => Some(Self::Matches),
            _ => None,
        }
    }
}
