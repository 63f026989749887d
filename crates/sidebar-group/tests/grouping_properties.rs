//! Property tests for grouping conservation and order

use proptest::prelude::*;
use sidebar_doc::{Document, EntryRef};
use sidebar_group::{
    GroupBy, GroupContext, GroupingMode, GroupingStrategy, KeyGrouping, RuleListClassifier,
    Selector, SuperGroupClassifier, SuperGroupRule,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Build one entry per spec: (category index or none, has priority)
fn entries(specs: &[(Option<u8>, bool)]) -> Vec<EntryRef> {
    let mut text = String::new();
    for (i, (category, priority)) in specs.iter().enumerate() {
        let cookie = if *priority { "[#A] " } else { "" };
        text.push_str(&format!("* TODO {cookie}Item {i}\n"));
        if let Some(c) = category {
            text.push_str(&format!(":PROPERTIES:\n:CATEGORY: c{c}\n:END:\n"));
        }
    }
    let doc = Document::org("gen.org", text).unwrap();
    let outline = doc.outline();
    outline
        .headings
        .iter()
        .map(|h| EntryRef::new(&doc, &outline, h).unwrap())
        .collect()
}

fn ids(groups: &[sidebar_group::Group]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.entries.iter().map(|e| e.snapshot().title.clone()))
        .collect()
}

proptest! {
    #[test]
    fn key_grouping_conserves_entries(specs in prop::collection::vec((prop::option::of(0u8..4), any::<bool>()), 0..30)) {
        let input = entries(&specs);
        let groups = KeyGrouping::new(Arc::new(GroupBy::Priority)).group(&input, &GroupContext::default());

        let out = ids(&groups);
        prop_assert_eq!(out.len(), input.len());
        let unique: HashSet<_> = out.iter().collect();
        prop_assert_eq!(unique.len(), input.len());
        prop_assert!(groups.iter().filter(|g| g.name.is_none()).count() <= 1);
    }

    #[test]
    fn key_buckets_follow_first_occurrence(specs in prop::collection::vec((prop::option::of(0u8..4), any::<bool>()), 1..30)) {
        let input = entries(&specs);
        let groups = KeyGrouping::new(Arc::new(GroupBy::Category)).group(&input, &GroupContext::default());

        let mut expected: Vec<String> = Vec::new();
        for e in &input {
            let c = e.snapshot().category.clone();
            if !expected.contains(&c) {
                expected.push(c);
            }
        }
        let actual: Vec<String> = groups.iter().map(|g| g.display_name().to_string()).collect();
        prop_assert_eq!(actual, expected);

        // Relative order inside each bucket is input order
        for g in &groups {
            let positions: Vec<usize> = g
                .entries
                .iter()
                .map(|e| input.iter().position(|i| i.snapshot().title == e.snapshot().title).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn rule_grouping_conserves_non_discarded(specs in prop::collection::vec((prop::option::of(0u8..4), any::<bool>()), 0..30)) {
        let input = entries(&specs);
        let rules = vec![
            SuperGroupRule::discard(Selector::Category(vec!["c0".into()])),
            SuperGroupRule::new("Important", Selector::Priority(vec!['A'])),
            SuperGroupRule::unnamed(Selector::AutoCategory),
        ];
        let groups = RuleListClassifier::new(rules).classify(&input, &GroupContext::default());

        let kept = input.iter().filter(|e| e.snapshot().category != "c0").count();
        let out = ids(&groups);
        prop_assert_eq!(out.len(), kept);
        let unique: HashSet<_> = out.iter().collect();
        prop_assert_eq!(unique.len(), kept);
        prop_assert!(groups.iter().all(|g| !g.is_empty()));
    }
}

#[test]
fn missing_keys_form_single_none_bucket() {
    let input = entries(&[(None, false), (Some(1), false), (None, false)]);
    let mode = GroupingMode::resolve(Some(Arc::new(GroupBy::Priority)), None).unwrap();
    let groups = mode.apply(&input, &GroupContext::default()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].display_name(), "None");
    assert_eq!(groups[0].len(), 3);
}
