mod helpers;

use std::collections::HashSet;

use lorebook::knowledge::{ListRequest, NewEntry};

fn page(limit: i64, offset: i64) -> ListRequest {
    ListRequest {
        limit: Some(limit),
        offset: Some(offset),
        category: None,
    }
}

#[test]
fn pages_cover_every_entry_exactly_once() {
    let store = helpers::test_store();
    let mut written = HashSet::new();
    for i in 0..23 {
        written.insert(store.write(&NewEntry::new(format!("note number {i}"))).unwrap().id);
    }

    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let response = store.list(&page(5, offset)).unwrap();
        assert_eq!(response.total, 23);
        if response.results.is_empty() {
            break;
        }
        offset += response.results.len() as i64;
        seen.extend(response.results.into_iter().map(|e| e.id));
    }

    assert_eq!(seen.len(), 23);
    assert_eq!(seen.into_iter().collect::<HashSet<_>>(), written);
}

#[test]
fn defaults_apply_when_paging_is_omitted() {
    let store = helpers::test_store();
    for i in 0..25 {
        store.write(&NewEntry::new(format!("entry {i}"))).unwrap();
    }
    let response = store.list(&ListRequest::default()).unwrap();
    assert_eq!(response.results.len(), store.settings().default_list_limit);
}

#[test]
fn offset_past_the_end_is_empty() {
    let store = helpers::test_store();
    store.write(&NewEntry::new("lonely")).unwrap();
    let response = store.list(&page(10, 50)).unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total, 1);
}

#[test]
fn category_filter_only_returns_that_category() {
    let store = helpers::test_store();
    store.write(&NewEntry::new("a").with_category("alpha")).unwrap();
    store.write(&NewEntry::new("b").with_category("beta")).unwrap();
    store.write(&NewEntry::new("c").with_category("alpha")).unwrap();

    let response = store
        .list(&ListRequest {
            category: Some("alpha".into()),
            ..Default::default()
        })
        .unwrap();
    let contents: Vec<&str> = response.results.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "c"]);
}

#[test]
fn invalid_paging_is_rejected() {
    let store = helpers::test_store();
    assert!(store.list(&page(0, 0)).unwrap_err().is_validation());
    assert!(store.list(&page(5, -1)).unwrap_err().is_validation());
}

#[test]
fn filtered_total_tells_the_client_when_to_stop() {
    let store = helpers::test_store();
    for i in 0..7 {
        let category = if i % 2 == 0 { "even" } else { "odd" };
        store
            .write(&NewEntry::new(format!("number {i}")).with_category(category))
            .unwrap();
    }

    let request = |offset| ListRequest {
        limit: Some(2),
        offset: Some(offset),
        category: Some("even".into()),
    };
    let first = store.list(&request(0)).unwrap();
    assert_eq!(first.total, 4);

    let mut fetched = first.results.len() as u64;
    while fetched < first.total {
        fetched += store.list(&request(fetched as i64)).unwrap().results.len() as u64;
    }
    assert_eq!(fetched, 4);
    assert_eq!(store.list(&ListRequest::default()).unwrap().total, 7);
}
