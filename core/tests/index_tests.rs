use webindex_core::{InvertedIndex, SearchResult};

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn two_documents() -> InvertedIndex {
    let mut index = InvertedIndex::new();
    index.add_all(&words("cat dog cat"), "a.html", 1);
    index.add_all(&words("dog"), "b.html", 1);
    index
}

#[test]
fn exact_search_aggregates_per_document() {
    let index = two_documents();
    let results = index.exact_search(&words("cat"));
    assert_eq!(
        results,
        [SearchResult {
            path: "a.html".to_string(),
            frequency: 2,
            position: 1,
        }]
    );
}

#[test]
fn partial_search_ranks_ties_by_position_then_path() {
    let index = two_documents();
    let results = index.partial_search(&words("do"));
    assert_eq!(results.len(), 2);
    // Frequencies tie at 1; "dog" is first word in b.html, second in
    // a.html, so position decides.
    assert_eq!(results[0].path, "b.html");
    assert_eq!(results[0].frequency, 1);
    assert_eq!(results[0].position, 1);
    assert_eq!(results[1].path, "a.html");
    assert_eq!(results[1].frequency, 1);
    assert_eq!(results[1].position, 2);
}

#[test]
fn partial_results_are_a_superset_of_exact() {
    let mut index = InvertedIndex::new();
    index.add_all(&words("cat catalog cattle dog"), "a.html", 1);
    index.add_all(&words("cat cat"), "b.html", 1);
    index.add_all(&words("catalog"), "c.html", 1);

    for word in ["cat", "dog", "zebra"] {
        let query = words(word);
        let exact = index.exact_search(&query);
        let partial = index.partial_search(&query);

        for exact_result in &exact {
            let partial_result = partial
                .iter()
                .find(|r| r.path == exact_result.path)
                .expect("partial must cover every exact path");
            assert!(partial_result.frequency >= exact_result.frequency);
        }
    }
}

#[test]
fn multi_word_query_folds_into_one_result_per_document() {
    let index = two_documents();
    let results = index.exact_search(&words("cat dog"));
    assert_eq!(results.len(), 2);
    // a.html: cat twice + dog once, earliest position 1.
    assert_eq!(results[0].path, "a.html");
    assert_eq!(results[0].frequency, 3);
    assert_eq!(results[0].position, 1);
    assert_eq!(results[1].path, "b.html");
    assert_eq!(results[1].frequency, 1);
}

#[test]
fn absent_words_yield_empty_results() {
    let index = two_documents();
    assert!(index.exact_search(&words("zebra")).is_empty());
    assert!(index.partial_search(&words("zebra")).is_empty());
}

#[test]
fn json_round_trip_preserves_structure() {
    let index = two_documents();
    let json = serde_json::to_string_pretty(&index).unwrap();
    let parsed: InvertedIndex = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, index);

    // Word and path keys come out in ascending order.
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let top_keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(top_keys, ["cat", "dog"]);
    let dog_paths: Vec<&String> = value["dog"].as_object().unwrap().keys().collect();
    assert_eq!(dog_paths, ["a.html", "b.html"]);
    assert_eq!(value["cat"]["a.html"], serde_json::json!([1, 3]));
}

#[test]
fn merge_order_does_not_matter() {
    let mut parts = Vec::new();
    for n in 0..4 {
        let mut part = InvertedIndex::new();
        part.add_all(&words("shared unique"), &format!("doc{n}.html"), 1);
        part.add("shared", "common.html", n + 1);
        parts.push(part);
    }

    let mut forward = InvertedIndex::new();
    for part in parts.clone() {
        forward.merge(part);
    }
    let mut backward = InvertedIndex::new();
    for part in parts.into_iter().rev() {
        backward.merge(part);
    }
    assert_eq!(forward, backward);
}
