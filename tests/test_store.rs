//! Tests for filtering, sorting and summaries of the result store

mod common;

use common::{
    assert_summary_matches_view, create_test_store, displayed_titles, record, stored_titles,
};
use manaconv::pipeline::{
    convert_into, Field, Filters, RawRecord, ResultStore, SortDirection, Summary, Vendor,
};

#[test]
fn test_empty_filters_return_everything_in_order() {
    let store = create_test_store();

    let all: Vec<&str> = store
        .filter(&Filters::new())
        .iter()
        .map(|r| r.title.as_str())
        .collect();

    assert_eq!(
        all,
        vec!["Lightning Bolt", "fire", "Counterspell", "Brainstorm", "Bolt Bend"]
    );
}

#[test]
fn test_filter_is_case_insensitive_substring() {
    let store = create_test_store();

    let hits: Vec<&str> = store
        .filter(&Filters::new().with(Field::Title, "BOLT"))
        .iter()
        .map(|r| r.title.as_str())
        .collect();

    // Substring, not prefix: "Lightning Bolt" matches too
    assert_eq!(hits, vec!["Lightning Bolt", "Bolt Bend"]);
}

#[test]
fn test_filters_combine_with_and() {
    let store = create_test_store();

    let filters = Filters::new()
        .with(Field::Edition, "modern")
        .with(Field::Foil, "1");
    let hits = store.filter(&filters);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "fire");
}

#[test]
fn test_numeric_fields_match_as_text() {
    let store = create_test_store();

    let hits = store.filter(&Filters::new().with(Field::Quantity, "2"));
    let titles: Vec<&str> = hits.iter().map(|r| r.title.as_str()).collect();

    // "2" and "12" both contain "2"
    assert_eq!(titles, vec!["Counterspell", "Bolt Bend"]);
}

#[test]
fn test_filter_result_is_subsequence_of_store() {
    let store = create_test_store();
    let all = store.records();

    for needle in ["", "o", "bolt", "2", "zzz", "modern"] {
        for field in Field::ALL {
            let hits = store.filter(&Filters::new().with(field, needle));
            let mut cursor = all.iter();
            for hit in &hits {
                assert!(
                    cursor.any(|r| r == *hit),
                    "{:?} not in order for {}={}",
                    hit,
                    field,
                    needle
                );
            }
        }
    }
}

#[test]
fn test_filter_query_does_not_mutate() {
    let store = create_test_store();
    let before = stored_titles(&store);

    let _ = store.filter(&Filters::new().with(Field::Title, "bolt"));

    assert_eq!(stored_titles(&store), before);
    assert_eq!(store.displayed_len(), 5);
}

#[test]
fn test_sort_toggles_per_field() {
    let mut store = create_test_store();

    assert_eq!(store.sort(Field::Quantity), SortDirection::Ascending);
    let ascending: Vec<i64> = store.records().iter().map(|r| r.quantity).collect();
    assert_eq!(ascending, vec![1, 2, 3, 4, 12]);

    assert_eq!(store.sort(Field::Quantity), SortDirection::Descending);
    let descending: Vec<i64> = store.records().iter().map(|r| r.quantity).collect();
    assert_eq!(descending, vec![12, 4, 3, 2, 1]);

    assert_eq!(store.sort(Field::Quantity), SortDirection::Ascending);
}

#[test]
fn test_sort_toggles_are_independent() {
    let mut store = create_test_store();

    store.sort(Field::Quantity);
    store.sort(Field::Title);
    assert_eq!(store.sort_direction(Field::Title), Some(SortDirection::Ascending));

    // Sorting another field does not reset quantity's toggle
    assert_eq!(store.sort(Field::Quantity), SortDirection::Descending);
    assert_eq!(store.sort_direction(Field::Edition), None);
}

#[test]
fn test_title_sort_ignores_case() {
    let mut store = create_test_store();

    store.sort(Field::Title);

    assert_eq!(
        stored_titles(&store),
        vec!["Bolt Bend", "Brainstorm", "Counterspell", "fire", "Lightning Bolt"]
    );
}

#[test]
fn test_sort_is_stable_for_ties() {
    let mut store = ResultStore::new();
    store.append(record("A", "Same", 0, 1));
    store.append(record("B", "same", 0, 1));
    store.append(record("C", "SAME", 0, 1));

    store.sort(Field::Edition);
    assert_eq!(stored_titles(&store), vec!["A", "B", "C"]);

    store.sort(Field::Edition);
    assert_eq!(stored_titles(&store), vec!["A", "B", "C"]);
}

#[test]
fn test_sort_keeps_filtered_view_in_new_order() {
    let mut store = create_test_store();
    store.set_filter(Field::Title, "bolt");

    store.sort(Field::Quantity);
    assert_eq!(displayed_titles(&store), vec!["Lightning Bolt", "Bolt Bend"]);

    store.sort(Field::Quantity);
    assert_eq!(displayed_titles(&store), vec!["Bolt Bend", "Lightning Bolt"]);
}

#[test]
fn test_summary_tracks_every_transition() {
    let mut store = ResultStore::new();
    assert_eq!(store.summary(), Summary::default());

    store.append(record("Opt", "Ixalan", 0, 3));
    assert_summary_matches_view(&store);
    store.append(record("Ponder", "Lorwyn", 1, 5));
    assert_summary_matches_view(&store);

    store.set_filter(Field::Foil, "1");
    assert_summary_matches_view(&store);
    assert_eq!(
        store.summary(),
        Summary {
            row_count: 1,
            quantity_total: 5
        }
    );

    store.append(record("Preordain", "M11", 1, 2));
    assert_summary_matches_view(&store);
    assert_eq!(store.summary().quantity_total, 7);

    store.sort(Field::Title);
    assert_summary_matches_view(&store);

    store.set_filter(Field::Foil, "");
    assert_eq!(
        store.summary(),
        Summary {
            row_count: 3,
            quantity_total: 10
        }
    );

    store.clear();
    assert_eq!(store.summary(), Summary::default());
}

#[test]
fn test_summary_saturates_on_huge_quantities() {
    let rows = vec![
        RawRecord::new()
            .with("Name", "Relentless Rats")
            .with("Quantity", "9223372036854775807"),
        RawRecord::new().with("Name", "Shadowborn Apostle").with("Quantity", "1"),
        RawRecord::new().with("Name", "Persistent Petitioners").with("Quantity", "1e30"),
    ];
    let mut store = ResultStore::new();
    convert_into(&mut store, &rows, Vendor::CardKingdom);

    assert_eq!(
        store.summary(),
        Summary {
            row_count: 3,
            quantity_total: i64::MAX
        }
    );

    store.set_filter(Field::Title, "shadowborn");
    assert_eq!(store.summary().quantity_total, 1);
}
