//! Rule matching — case-insensitive substring containment over a rule snapshot.

/// Policy for resolving overlapping triggers (e.g. "hi" and "hit").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// First matching trigger in storage order wins.
    #[default]
    First,
    /// Longest matching trigger wins; storage order breaks ties.
    Longest,
}

impl MatchMode {
    /// Parse a mode from its config string. Unknown values fall back to `First`.
    pub fn from_config(s: &str) -> Self {
        match s {
            "longest" => Self::Longest,
            _ => Self::First,
        }
    }
}

/// Find the rule that fires for `text`, if any.
///
/// Matching is case-insensitive substring containment: a rule fires when the
/// lower-cased inbound text contains its trigger. Triggers are stored
/// lower-cased, so only the inbound side is folded here. At most one rule
/// fires per message. Empty triggers are rejected at rule-creation time;
/// this function does no validation of its own.
pub fn find_reply<'a>(
    text: &str,
    rules: &'a [(String, String)],
    mode: MatchMode,
) -> Option<(&'a str, &'a str)> {
    let haystack = text.to_lowercase();

    match mode {
        MatchMode::First => rules
            .iter()
            .find(|(trigger, _)| haystack.contains(trigger.as_str()))
            .map(|(t, r)| (t.as_str(), r.as_str())),
        MatchMode::Longest => rules
            .iter()
            .filter(|(trigger, _)| haystack.contains(trigger.as_str()))
            // max_by_key returns the LAST maximum; enumerate + reversed index
            // keeps the earliest-stored trigger on ties.
            .enumerate()
            .max_by_key(|(i, (trigger, _))| (trigger.len(), usize::MAX - i))
            .map(|(_, (t, r))| (t.as_str(), r.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(t, r)| (t.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let set = rules(&[("hello", "hi")]);
        let hit = find_reply("Say HELLO now", &set, MatchMode::First);
        assert_eq!(hit, Some(("hello", "hi")));
    }

    #[test]
    fn test_substring_containment_not_word_boundary() {
        let set = rules(&[("urgent", "I'll reply ASAP")]);
        assert_eq!(
            find_reply("this is urgent!!", &set, MatchMode::First),
            Some(("urgent", "I'll reply ASAP"))
        );
        // Partial containment inside a longer word still fires.
        assert_eq!(
            find_reply("urgently needed", &set, MatchMode::First),
            Some(("urgent", "I'll reply ASAP"))
        );
    }

    #[test]
    fn test_no_match_yields_none() {
        let set = rules(&[("urgent", "asap")]);
        assert_eq!(find_reply("nothing special", &set, MatchMode::First), None);
    }

    #[test]
    fn test_empty_rule_set() {
        assert_eq!(find_reply("anything", &[], MatchMode::First), None);
    }

    #[test]
    fn test_first_match_wins_in_storage_order() {
        let set = rules(&[("hi", "one"), ("hit", "two")]);
        assert_eq!(
            find_reply("a direct hit", &set, MatchMode::First),
            Some(("hi", "one"))
        );
    }

    #[test]
    fn test_longest_match_wins_when_configured() {
        let set = rules(&[("hi", "one"), ("hit", "two")]);
        assert_eq!(
            find_reply("a direct hit", &set, MatchMode::Longest),
            Some(("hit", "two"))
        );
    }

    #[test]
    fn test_longest_mode_ties_break_by_storage_order() {
        let set = rules(&[("abc", "first"), ("bcd", "second")]);
        assert_eq!(
            find_reply("xabcdx", &set, MatchMode::Longest),
            Some(("abc", "first"))
        );
    }

    #[test]
    fn test_mode_from_config() {
        assert_eq!(MatchMode::from_config("longest"), MatchMode::Longest);
        assert_eq!(MatchMode::from_config("first"), MatchMode::First);
        assert_eq!(MatchMode::from_config("garbage"), MatchMode::First);
    }
}
