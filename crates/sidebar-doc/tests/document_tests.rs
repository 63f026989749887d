//! Document, marker and view integration tests

use pretty_assertions::assert_eq;
use sidebar_doc::{Document, DocumentView, EntryRef, ViewKind};

const TASKS: &str = "\
#+CATEGORY: work
* TODO Task one
* TODO Task two
** TODO Subtask A
** DONE Subtask B
* TODO Task three
";

#[test]
fn entry_refs_survive_edits_in_other_views() {
    let doc = Document::org("tasks.org", TASKS).unwrap();
    let outline = doc.outline();
    let subtask = &outline.headings[2];
    let entry = EntryRef::new(&doc, &outline, subtask).unwrap();

    let mirror = DocumentView::indirect("<tree>tasks.org", doc.clone(), ViewKind::Mirror);
    mirror.document().insert(0, "#+TITLE: Tasks\n").unwrap();

    let (_, heading) = entry.resolve().unwrap();
    assert_eq!(heading.title, "Subtask A");
    assert_eq!(entry.snapshot().category, "work");
}

#[test]
fn killing_document_invalidates_everything() {
    let doc = Document::org("tasks.org", TASKS).unwrap();
    let outline = doc.outline();
    let entries: Vec<EntryRef> = outline
        .headings
        .iter()
        .map(|h| EntryRef::new(&doc, &outline, h).unwrap())
        .collect();

    doc.kill();
    for entry in &entries {
        assert!(entry.resolve().unwrap_err().is_stale());
    }
    assert!(doc.marker(0).is_err());
}

#[test]
fn deleting_a_heading_collapses_markers() {
    let doc = Document::org("tasks.org", TASKS).unwrap();
    let outline = doc.outline();
    let two = outline.headings[1].clone();
    let three = outline.headings[4].clone();
    let m_sub = doc.marker(outline.headings[2].begin).unwrap();
    let m_three = doc.marker(three.begin).unwrap();

    doc.delete(two.begin..two.subtree_end).unwrap();

    assert_eq!(m_sub.offset(), two.begin);
    assert_eq!(m_three.offset(), two.begin);
    assert_eq!(doc.heading_at(m_three.offset()).unwrap().title, "Task three");
}

#[test]
fn markdown_and_org_agree_on_structure() {
    let org = Document::org("a.org", "* TODO Plan\n** Step\n").unwrap();
    let md = Document::markdown("a.md", "# TODO Plan\n\n## Step\n").unwrap();
    let org_titles: Vec<_> = org.outline().headings.iter().map(|h| h.path.to_string()).collect();
    let md_titles: Vec<_> = md.outline().headings.iter().map(|h| h.path.to_string()).collect();
    assert_eq!(org_titles, md_titles);
}

#[test]
fn subtree_view_renders_independently() {
    let doc = Document::org("tasks.org", TASKS).unwrap();
    let two = doc.outline().headings[1].clone();
    let mut view = DocumentView::indirect("tasks.org::Task two", doc.clone(), ViewKind::Subtree);
    view.narrow(two.begin..two.subtree_end).unwrap();
    view.hide_bodies();
    let base = DocumentView::new(doc);
    assert_eq!(view.render(), "* TODO Task two\n** TODO Subtask A\n** DONE Subtask B\n");
    assert!(base.render().contains("* TODO Task three"));
}
