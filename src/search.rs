//! Location search for the header search box

use crate::data::{all_locations, Location};

/// Case-insensitive match on name and provider, plus region code for regions
pub fn search(term: &str) -> Vec<Location> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    all_locations()
        .filter(|loc| {
            loc.name().to_lowercase().contains(&needle)
                || loc.provider().name().to_lowercase().contains(&needle)
                || matches!(loc, Location::Region(r) if r.code.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Text input plus the highlighted result
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
    pub results: Vec<Location>,
    pub cursor: usize,
}

impl SearchState {
    pub fn open(&mut self) {
        self.active = true;
        self.query.clear();
        self.results.clear();
        self.cursor = 0;
    }

    pub fn close(&mut self) {
        self.active = false;
        self.query.clear();
        self.results.clear();
        self.cursor = 0;
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.refresh();
    }

    pub fn move_cursor(&mut self, down: bool) {
        if self.results.is_empty() {
            return;
        }
        let n = self.results.len();
        self.cursor = if down { (self.cursor + 1) % n } else { (self.cursor + n - 1) % n };
    }

    /// Selected result; closes the search box
    pub fn select(&mut self) -> Option<Location> {
        let picked = self.results.get(self.cursor).copied();
        self.close();
        picked
    }

    fn refresh(&mut self) {
        self.results = search(&self.query);
        self.cursor = self.cursor.min(self.results.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(term: &str) -> Vec<&'static str> {
        search(term).iter().map(|l| l.id()).collect()
    }

    #[test]
    fn empty_term_finds_nothing() {
        assert!(search("").is_empty());
        assert!(search("   ").is_empty());
    }

    #[test]
    fn matches_names_case_insensitively() {
        assert_eq!(ids("BINANCE"), vec!["binance-tokyo"]);
        assert_eq!(ids("tokyo"), vec!["aws-tokyo"]);
    }

    #[test]
    fn matches_provider() {
        let azure = ids("azure");
        assert!(azure.contains(&"bybit-hongkong"));
        assert!(azure.contains(&"bitfinex-london"));
        assert!(azure.contains(&"azure-uk-south"));
        assert_eq!(azure.len(), 4);
    }

    #[test]
    fn region_codes_only_match_regions() {
        // exchanges carry the same code but are not matched on it
        assert_eq!(ids("europe-west4"), vec!["gcp-amsterdam"]);
        assert_eq!(ids("ap-northeast-2"), Vec::<&str>::new());
    }

    #[test]
    fn state_navigation() {
        let mut state = SearchState::default();
        state.open();
        for c in "aws".chars() {
            state.push(c);
        }
        let n = state.results.len();
        assert!(n > 1);
        state.move_cursor(false);
        assert_eq!(state.cursor, n - 1);
        state.move_cursor(true);
        assert_eq!(state.cursor, 0);
        state.move_cursor(true);
        let expected = state.results[1];
        assert_eq!(state.select(), Some(expected));
        assert!(!state.active && state.query.is_empty());
    }

    #[test]
    fn narrowing_clamps_cursor() {
        let mut state = SearchState::default();
        state.open();
        state.push('a');
        state.cursor = state.results.len() - 1;
        for c in "ws sing".chars() {
            state.push(c);
        }
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.cursor, 0);
        state.pop();
        assert!(state.select().is_some());
    }
}
