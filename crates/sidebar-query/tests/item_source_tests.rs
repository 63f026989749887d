//! Item source integration tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sidebar_doc::DocumentView;
use sidebar_query::{parse_sort_keys, ItemSource, QueryError, QueryOptions};
use sidebar_test_utils::{agenda_document, heading, ten_tasks, today};

fn titles(entries: &[sidebar_doc::EntryRef]) -> Vec<String> {
    entries.iter().map(|e| e.snapshot().title.clone()).collect()
}

#[test]
fn narrowing_to_task_three_returns_only_its_subtasks() {
    let doc = ten_tasks();
    let task3 = heading(&doc, "Task 3");
    let mut view = DocumentView::new(doc);
    view.narrow(task3.contents_begin..task3.subtree_end).unwrap();

    let source = ItemSource::default();
    let narrowed = source
        .query(&[view.clone()], "(todo)", &QueryOptions::default().with_narrow(true))
        .unwrap();
    assert_eq!(titles(&narrowed), vec!["Subtask 3.1", "Subtask 3.2"]);

    let everything = source
        .query(&[view], "(todo)", &QueryOptions::default())
        .unwrap();
    assert_eq!(everything.len(), 12);
}

#[test]
fn sort_keys_apply_in_order() {
    let view = DocumentView::new(agenda_document());
    let options = QueryOptions::default()
        .with_today(today())
        .with_sort(parse_sort_keys(&["priority", "title"]).unwrap());
    let entries = ItemSource::default().query(&[view], "(todo)", &options).unwrap();
    assert_eq!(
        titles(&entries),
        vec![
            "Pay rent",
            "Quarterly report",
            "Water plants",
            "Book travel",
            "Call grandma",
            "Tidy inbox",
        ]
    );
}

#[test]
fn date_sort_puts_undated_last() {
    let view = DocumentView::new(agenda_document());
    let options = QueryOptions::default()
        .with_today(today())
        .with_sort(parse_sort_keys(&["date"]).unwrap());
    let entries = ItemSource::default()
        .query(&[view], "(and (todo) (planning))", &options)
        .unwrap();
    assert_eq!(titles(&entries), vec!["Pay rent", "Water plants", "Quarterly report"]);
}

#[test]
fn multiple_views_keep_view_order() {
    let agenda = DocumentView::new(agenda_document());
    let tasks = DocumentView::new(ten_tasks());
    let entries = ItemSource::default()
        .query(&[tasks, agenda], "(tags urgent garden)", &QueryOptions::default())
        .unwrap();
    assert_eq!(titles(&entries), vec!["Water plants", "Quarterly report"]);

    let entries = ItemSource::default()
        .query(
            &[DocumentView::new(ten_tasks()), DocumentView::new(agenda_document())],
            "(heading \"^task 1$\" ) (todo)",
            &QueryOptions::default(),
        )
        .unwrap();
    assert_eq!(entries[0].snapshot().document, "tasks.org");
}

#[test]
fn malformed_query_surfaces_error() {
    let view = DocumentView::new(ten_tasks());
    let err = ItemSource::default()
        .query(&[view], "(and (todo)", &QueryOptions::default())
        .unwrap_err();
    assert!(matches!(err, QueryError::Syntax { ref query, .. } if query == "(and (todo)"));
}

#[test]
fn dead_document_fails() {
    let doc = ten_tasks();
    let view = DocumentView::new(doc.clone());
    doc.kill();
    let err = ItemSource::default()
        .query(&[view], "(todo)", &QueryOptions::default())
        .unwrap_err();
    assert!(matches!(err, QueryError::Document(ref e) if e.is_stale()));
}

proptest! {
    #[test]
    fn narrowing_never_adds_entries(index in 0usize..13) {
        let doc = ten_tasks();
        let h = doc.outline().headings[index].clone();
        let mut view = DocumentView::new(doc);
        let source = ItemSource::default();
        let all = source.query(&[view.clone()], "(todo)", &QueryOptions::default()).unwrap();

        view.narrow(h.begin..h.subtree_end).unwrap();
        let narrowed = source
            .query(&[view], "(todo)", &QueryOptions::default().with_narrow(true))
            .unwrap();

        prop_assert!(narrowed.len() <= all.len());
        for entry in &narrowed {
            let pos = entry.marker().offset();
            prop_assert!(pos >= h.begin && pos < h.subtree_end);
        }
    }
}
