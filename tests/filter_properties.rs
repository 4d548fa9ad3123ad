use sunbeam_tui::{default_keybindings_handle, fuzzy_match, Filter, FilterItem};

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    title: String,
}

impl FilterItem for Entry {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_value(&self) -> String {
        self.title.clone()
    }

    fn render(&self, _width: usize, _selected: bool) -> String {
        self.title.clone()
    }
}

const TITLES: [&str; 12] = [
    "Open Repository",
    "Search Issues",
    "List Pull Requests",
    "Create Gist",
    "open in browser",
    "Reload extensions",
    "Copy Repository URL",
    "search notes",
    "Git Status",
    "Go to file",
    "git push",
    "Settings",
];

fn entries() -> Vec<Entry> {
    TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| Entry {
            id: format!("item-{index}"),
            title: title.to_string(),
        })
        .collect()
}

fn filter(height: usize) -> Filter<Entry> {
    let mut filter = Filter::new(default_keybindings_handle());
    filter.set_size(60, height);
    filter.set_items(entries());
    filter
}

fn score(query: &str, entry: &Entry) -> i32 {
    fuzzy_match(query, &entry.filter_value()).map_or(0, |matched| matched.score)
}

#[test]
fn kept_items_score_positive_in_non_increasing_order() {
    for query in ["re", "o", "git", "Git", "srch", "zz"] {
        let mut filter = filter(5);
        filter.filter_items(query);
        let scores: Vec<i32> = filter.filtered().map(|entry| score(query, entry)).collect();
        assert!(scores.iter().all(|score| *score > 0), "{query}: {scores:?}");
        assert!(
            scores.windows(2).all(|pair| pair[0] >= pair[1]),
            "{query}: {scores:?}"
        );
    }
}

#[test]
fn ties_keep_original_order() {
    let mut filter = Filter::new(default_keybindings_handle());
    filter.set_size(60, 5);
    filter.set_items(
        ["alpha one", "alpha two", "alpha three"]
            .iter()
            .enumerate()
            .map(|(index, title)| Entry {
                id: index.to_string(),
                title: title.to_string(),
            })
            .collect(),
    );
    filter.filter_items("alpha");
    let ids: Vec<&str> = filter.filtered().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
}

#[test]
fn empty_query_restores_full_original_order() {
    let mut filter = filter(5);
    filter.filter_items("git");
    filter.filter_items("");
    let titles: Vec<&str> = filter.filtered().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, TITLES.to_vec());
}

#[test]
fn smart_case_narrows_uppercase_queries() {
    let mut filter = filter(5);
    filter.filter_items("Git");
    let titles: Vec<&str> = filter.filtered().map(|entry| entry.title.as_str()).collect();
    assert!(titles.contains(&"Git Status"));
    assert!(!titles.contains(&"git push"));
}

#[test]
fn cursor_round_trip_keeps_window_invariant() {
    for height in [1, 3, 5, 20] {
        let mut filter = filter(height);
        let len = filter.filtered_len();
        for _ in 0..len {
            filter.cursor_down();
            let visible = filter.visible_count();
            assert!(filter.min_index() <= filter.cursor());
            assert!(filter.cursor() < filter.min_index() + visible);
        }
        assert_eq!(filter.cursor(), 0);
        for _ in 0..len {
            filter.cursor_up();
            assert!(filter.min_index() <= filter.cursor());
            assert!(filter.cursor() < filter.min_index() + filter.visible_count());
        }
        assert_eq!(filter.cursor(), 0);
    }
}

#[test]
fn reload_preserves_query_and_selection() {
    let mut filter = filter(3);
    filter.filter_items("o");
    assert!(filter.select("item-9"));
    let query = filter.query().to_string();

    filter.set_items(entries());
    filter.filter_items(&query);
    assert!(filter.select("item-9"));
    assert_eq!(filter.selection().map(|entry| entry.title.as_str()), Some("Go to file"));
}
