use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use sarissa_suggest::entity::{ElevateWord, SuggestItem, SuggestItemKind};
use sarissa_suggest::settings::file::FileSettingsStore;
use sarissa_suggest::suggester::Suggester;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single(word: &str, kind: SuggestItemKind) -> SuggestItem {
    SuggestItem::new(vec![word.to_string()], vec![vec![word.to_string()]], kind).unwrap()
}

fn popular_suggester() -> Suggester {
    init_logger();
    let suggester = Suggester::builder().build().unwrap();
    for (query, times) in [
        ("content:fess", 5),
        ("content:suggest", 3),
        ("content:search", 1),
        ("content:engine", 1),
    ] {
        for _ in 0..times {
            suggester.indexer().index_from_query_string(query).unwrap();
        }
    }
    suggester
        .indexer()
        .index(vec![single("document", SuggestItemKind::Document)]);
    suggester
        .indexer()
        .add_elevate_word(ElevateWord::new("elevated", 3.0))
        .unwrap();
    suggester.refresh().unwrap();
    suggester
}

#[test]
fn test_popular_words_cover_every_eligible_word() {
    let suggester = popular_suggester();

    let mut seen = HashSet::new();
    for _ in 0..200 {
        let response = suggester
            .popular_words()
            .size(2)
            .exclude_word("engine")
            .execute()
            .unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(response.num(), 2);
        let distinct: HashSet<&String> = response.words().iter().collect();
        assert_eq!(distinct.len(), 2);
        seen.extend(response.words().iter().cloned());
    }

    let expected: HashSet<String> = ["fess", "suggest", "search"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_popular_words_total_is_independent_of_size() {
    let suggester = popular_suggester();

    let response = suggester.popular_words().size(1).execute().unwrap();
    assert_eq!(response.total, 4);
    assert_eq!(response.num(), 1);

    let response = suggester.popular_words().size(10).execute().unwrap();
    assert_eq!(response.total, 4);
    assert_eq!(response.num(), 4);
    assert!(!response.words().contains(&"document".to_string()));
    assert!(!response.words().contains(&"elevated".to_string()));
}

#[test]
fn test_popular_words_skip_bad_words_and_detail() {
    let suggester = popular_suggester();
    suggester.indexer().add_bad_word("fes").unwrap();

    let response = suggester
        .popular_words()
        .size(10)
        .suggest_detail(true)
        .execute()
        .unwrap();
    assert_eq!(response.total, 3);
    assert_eq!(response.items.len(), 3);
    assert!(
        response
            .items
            .iter()
            .all(|item| item.kind() == SuggestItemKind::Query)
    );
}

#[test]
fn test_delete_old_words_keeps_recent_and_elevated_items() {
    init_logger();
    let suggester = Suggester::builder().build().unwrap();
    let week_ago = Utc::now() - Duration::days(7);

    suggester
        .settings()
        .add_elevate_word(&ElevateWord::new("pinned", 2.0))
        .unwrap();
    suggester.indexer().index(vec![
        single("stale", SuggestItemKind::Query).with_updated_at(week_ago),
        single("fresh", SuggestItemKind::Query),
        ElevateWord::new("pinned", 2.0)
            .to_suggest_item()
            .unwrap()
            .with_updated_at(week_ago),
    ]);

    let removed = suggester
        .indexer()
        .delete_old_words(Utc::now() - Duration::days(1))
        .unwrap();
    assert_eq!(removed, 1);

    assert!(suggester.suggest().query("stale").execute().unwrap().is_empty());
    assert_eq!(suggester.suggest().query("fresh").execute().unwrap().num(), 1);
    assert_eq!(suggester.suggest().query("pinned").execute().unwrap().num(), 1);
}

#[test]
fn test_merge_refreshes_timestamp() {
    init_logger();
    let suggester = Suggester::builder().build().unwrap();
    let week_ago = Utc::now() - Duration::days(7);

    suggester
        .indexer()
        .index(vec![single("fess", SuggestItemKind::Query).with_updated_at(week_ago)]);
    suggester
        .indexer()
        .index(vec![single("fess", SuggestItemKind::Query)]);

    let removed = suggester
        .indexer()
        .delete_old_words(Utc::now() - Duration::days(1))
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(suggester.store().count().unwrap(), 1);
}

#[test]
fn test_settings_survive_restart() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    {
        let suggester = Suggester::builder()
            .settings_store(Arc::new(FileSettingsStore::open(&path).unwrap()))
            .build()
            .unwrap();
        suggester
            .indexer()
            .add_elevate_word(ElevateWord::new("fess", 4.0).with_readings(["fess", "fesu"]))
            .unwrap();
        suggester.indexer().add_bad_word("spam").unwrap();
    }

    let suggester = Suggester::builder()
        .settings_store(Arc::new(FileSettingsStore::open(&path).unwrap()))
        .build()
        .unwrap();
    assert_eq!(suggester.settings().bad_words().unwrap(), vec!["spam"]);
    assert!(suggester.suggest().query("fes").execute().unwrap().is_empty());

    let response = suggester.indexer().restore_elevate_word().unwrap();
    assert_eq!(response.num_suggest_docs, 1);

    let response = suggester
        .suggest()
        .query("fesu")
        .suggest_detail(true)
        .execute()
        .unwrap();
    assert_eq!(response.words(), ["fess"]);
    assert_eq!(response.items[0].user_boost(), 4.0);
}
