//! Rule-list (super-group) grouping
//!
//! An ordered list of [`SuperGroupRule`]s is applied to every entry; the
//! first rule whose selector matches routes the entry into that rule's
//! group. Entries no rule claims land in the catch-all group, which is
//! emitted last and only when non-empty.
//!
//! Rules are declarative and serialisable so they can live in config:
//!
//! ```toml
//! [[super_groups]]
//! name = "Due soon"
//! selector = { deadline = "future" }
//!
//! [[super_groups]]
//! selector = "auto_category"
//! ```

use crate::strategy::{Group, GroupContext, GroupError, GroupingStrategy, OTHER_ITEMS};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sidebar_doc::{EntryRef, EntrySnapshot, Timestamp};
use std::fmt;
use std::sync::Arc;

/// Compiled regex that serialises as its source text
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern; without capitals it matches case-insensitively
    ///
    /// # Errors
    /// Returns `InvalidRule` if the regex does not compile
    pub fn new(source: &str) -> Result<Self, GroupError> {
        regex::RegexBuilder::new(source)
            .case_insensitive(!source.chars().any(char::is_uppercase))
            .build()
            .map(Self)
            .map_err(|e| GroupError::InvalidRule {
                rule: source.to_string(),
                message: e.to_string(),
            })
    }

    /// Source text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether `text` matches
    #[inline]
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Relative position of a planning date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum When {
    /// Before today
    Past,
    /// On today's date
    Today,
    /// After today
    Future,
    /// Any date present
    Any,
}

impl When {
    fn holds(self, stamp: Option<Timestamp>, ctx: &GroupContext) -> bool {
        let Some(stamp) = stamp else {
            return false;
        };
        match self {
            Self::Past => stamp.date < ctx.today,
            Self::Today => stamp.date == ctx.today,
            Self::Future => stamp.date > ctx.today,
            Self::Any => true,
        }
    }
}

/// Property an auto selector expands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoKey {
    Category,
    Parent,
    Todo,
    Priority,
}

/// Entry selector of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// Listed to-do keywords; empty means any open to-do
    Todo(Vec<String>),
    /// Any of the tags
    Tag(Vec<String>),
    /// Any of the priorities
    Priority(Vec<char>),
    /// Any of the categories
    Category(Vec<String>),
    /// Title matches
    Heading(Pattern),
    /// Deadline date relative to today
    Deadline(When),
    /// Scheduled date relative to today
    Scheduled(When),
    /// Exact heading level
    Level(usize),
    /// At least one of the selectors
    AnyOf(Vec<Selector>),
    /// Every one of the selectors
    AllOf(Vec<Selector>),
    /// Negation
    Not(Box<Selector>),
    /// One group per category
    AutoCategory,
    /// One group per parent heading
    AutoParent,
    /// One group per to-do keyword
    AutoTodo,
    /// One group per priority
    AutoPriority,
}

impl Selector {
    fn auto_key(&self) -> Option<AutoKey> {
        match self {
            Self::AutoCategory => Some(AutoKey::Category),
            Self::AutoParent => Some(AutoKey::Parent),
            Self::AutoTodo => Some(AutoKey::Todo),
            Self::AutoPriority => Some(AutoKey::Priority),
            _ => None,
        }
    }

    /// Check whether the selector claims `entry`
    ///
    /// Auto selectors claim every entry that has a value for their key.
    #[must_use]
    pub fn matches(&self, s: &EntrySnapshot, ctx: &GroupContext) -> bool {
        match self {
            Self::Todo(keywords) if keywords.is_empty() => s.is_open_todo(),
            Self::Todo(keywords) => s.todo.as_ref().is_some_and(|t| keywords.contains(t)),
            Self::Tag(tags) => tags
                .iter()
                .any(|t| s.tags.iter().any(|own| own.eq_ignore_ascii_case(t))),
            Self::Priority(list) => s.priority.is_some_and(|p| list.contains(&p)),
            Self::Category(names) => names.contains(&s.category),
            Self::Heading(pattern) => pattern.is_match(&s.title),
            Self::Deadline(when) => when.holds(s.deadline, ctx),
            Self::Scheduled(when) => when.holds(s.scheduled, ctx),
            Self::Level(level) => s.level == *level,
            Self::AnyOf(list) => list.iter().any(|sel| sel.matches(s, ctx)),
            Self::AllOf(list) => list.iter().all(|sel| sel.matches(s, ctx)),
            Self::Not(inner) => !inner.matches(s, ctx),
            Self::AutoCategory | Self::AutoParent | Self::AutoTodo | Self::AutoPriority => {
                self.auto_value(s).is_some()
            }
        }
    }

    fn auto_value(&self, s: &EntrySnapshot) -> Option<String> {
        match self.auto_key()? {
            AutoKey::Category => Some(s.category.clone()),
            AutoKey::Parent => s.parent_title.clone(),
            AutoKey::Todo => s.todo.clone(),
            AutoKey::Priority => s.priority.map(|p| format!("Priority {p}")),
        }
    }

    /// Short description used when a rule has no name
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Todo(k) if k.is_empty() => "To-do items".into(),
            Self::Todo(k) => k.join(" or "),
            Self::Tag(t) => t.join(" or "),
            Self::Priority(p) => format!(
                "Priority {}",
                p.iter().map(char::to_string).collect::<Vec<_>>().join(" or ")
            ),
            Self::Category(c) => c.join(" or "),
            Self::Heading(p) => format!("Headings matching {}", p.as_str()),
            Self::Deadline(w) => format!("Deadline {}", when_label(*w)),
            Self::Scheduled(w) => format!("Scheduled {}", when_label(*w)),
            Self::Level(l) => format!("Level {l}"),
            Self::AnyOf(list) => list.iter().map(Self::describe).collect::<Vec<_>>().join(" or "),
            Self::AllOf(list) => list.iter().map(Self::describe).collect::<Vec<_>>().join(" and "),
            Self::Not(inner) => format!("Not {}", inner.describe()),
            Self::AutoCategory => "By category".into(),
            Self::AutoParent => "By parent".into(),
            Self::AutoTodo => "By to-do keyword".into(),
            Self::AutoPriority => "By priority".into(),
        }
    }
}

fn when_label(when: When) -> &'static str {
    match when {
        When::Past => "past",
        When::Today => "today",
        When::Future => "future",
        When::Any => "set",
    }
}

/// One super-group rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperGroupRule {
    /// Group name; defaults to the selector's description
    #[serde(default)]
    pub name: Option<String>,
    /// Which entries the group claims
    pub selector: Selector,
    /// Sort position among groups; equal orders keep declaration order
    #[serde(default)]
    pub order: i32,
    /// Drop matching entries instead of grouping them
    #[serde(default)]
    pub discard: bool,
}

impl SuperGroupRule {
    /// Named rule
    #[must_use]
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: Some(name.into()),
            selector,
            order: 0,
            discard: false,
        }
    }

    /// Unnamed rule (auto selectors name their own groups)
    #[must_use]
    pub fn unnamed(selector: Selector) -> Self {
        Self {
            name: None,
            selector,
            order: 0,
            discard: false,
        }
    }

    /// Rule that drops matching entries
    #[must_use]
    pub fn discard(selector: Selector) -> Self {
        Self {
            name: None,
            selector,
            order: 0,
            discard: true,
        }
    }

    /// Builder: set order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    fn group_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.selector.describe())
    }
}

/// Multi-criteria classifier consuming a rule list
pub trait SuperGroupClassifier: Send + Sync + fmt::Debug {
    /// Bucket entries into ordered groups
    fn classify(&self, entries: &[EntryRef], ctx: &GroupContext) -> Vec<Group>;
}

/// First-match rule interpreter
#[derive(Debug, Clone, Default)]
pub struct RuleListClassifier {
    rules: Vec<SuperGroupRule>,
}

#[derive(Debug)]
enum Route {
    Group { rule: usize, name: String },
    Discard,
    Other,
}

impl RuleListClassifier {
    /// Create from ordered rules
    #[must_use]
    pub fn new(rules: Vec<SuperGroupRule>) -> Self {
        Self { rules }
    }

    /// Rules in declaration order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[SuperGroupRule] {
        &self.rules
    }

    fn route(&self, s: &EntrySnapshot, ctx: &GroupContext) -> Route {
        for (i, rule) in self.rules.iter().enumerate() {
            if !rule.selector.matches(s, ctx) {
                continue;
            }
            if rule.discard {
                return Route::Discard;
            }
            let name = match rule.selector.auto_value(s) {
                Some(value) => value,
                None => rule.group_name(),
            };
            return Route::Group { rule: i, name };
        }
        Route::Other
    }
}

impl SuperGroupClassifier for RuleListClassifier {
    fn classify(&self, entries: &[EntryRef], ctx: &GroupContext) -> Vec<Group> {
        // Keyed by (rule index, group name) so auto rules expand in place
        let mut buckets: IndexMap<(usize, String), Vec<EntryRef>> = IndexMap::new();
        let mut other = Group::new(Some(OTHER_ITEMS.to_string()));
        let mut discarded = 0usize;

        for entry in entries {
            match self.route(entry.snapshot(), ctx) {
                Route::Group { rule, name } => {
                    buckets.entry((rule, name)).or_default().push(entry.clone());
                }
                Route::Discard => discarded += 1,
                Route::Other => other.entries.push(entry.clone()),
            }
        }

        let mut keyed: Vec<((usize, String), Vec<EntryRef>)> = buckets.into_iter().collect();
        // Declaration order, then first occurrence within a rule; stable on `order`
        keyed.sort_by_key(|((rule, _), _)| *rule);
        keyed.sort_by_key(|((rule, _), _)| self.rules[*rule].order);

        let mut groups: Vec<Group> = keyed
            .into_iter()
            .map(|((_, name), entries)| Group {
                name: Some(name),
                entries,
            })
            .collect();
        if !other.is_empty() {
            groups.push(other);
        }

        if discarded > 0 {
            tracing::debug!(discarded, "rule list discarded entries");
        }
        groups
    }
}

/// Rule-list grouping strategy
#[derive(Debug, Clone)]
pub struct RuleListGrouping {
    classifier: Arc<dyn SuperGroupClassifier>,
}

impl RuleListGrouping {
    /// Create with a classifier
    #[inline]
    #[must_use]
    pub fn new(classifier: Arc<dyn SuperGroupClassifier>) -> Self {
        Self { classifier }
    }
}

impl GroupingStrategy for RuleListGrouping {
    fn group(&self, entries: &[EntryRef], ctx: &GroupContext) -> Vec<Group> {
        self.classifier.classify(entries, ctx)
    }

    fn name(&self) -> &'static str {
        "rule-list"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidebar_test_utils::{agenda_document, today};

    fn entries() -> Vec<EntryRef> {
        let doc = agenda_document();
        let outline = doc.outline();
        outline
            .headings
            .iter()
            .map(|h| EntryRef::new(&doc, &outline, h).unwrap())
            .collect()
    }

    fn names(groups: &[Group]) -> Vec<String> {
        groups.iter().map(|g| g.display_name().to_string()).collect()
    }

    fn titles(group: &Group) -> Vec<String> {
        group.entries.iter().map(|e| e.snapshot().title.clone()).collect()
    }

    #[test]
    fn first_match_wins() {
        let rules = vec![
            SuperGroupRule::new("Urgent", Selector::Tag(vec!["urgent".into()])),
            SuperGroupRule::new("Important", Selector::Priority(vec!['A'])),
        ];
        let groups = RuleListClassifier::new(rules).classify(&entries(), &GroupContext::on(today()));
        assert_eq!(names(&groups), vec!["Urgent", "Important", "Other items"]);
        assert_eq!(titles(&groups[0]), vec!["Quarterly report"]);
        assert_eq!(titles(&groups[1]), vec!["Pay rent"]);
        assert_eq!(groups[2].len(), 6);
    }

    #[test]
    fn catch_all_omitted_when_empty() {
        let rules = vec![SuperGroupRule::new("Everything", Selector::Not(Box::new(Selector::Level(99))))];
        let groups = RuleListClassifier::new(rules).classify(&entries(), &GroupContext::on(today()));
        assert_eq!(names(&groups), vec!["Everything"]);
    }

    #[test]
    fn discard_drops_entries() {
        let rules = vec![
            SuperGroupRule::discard(Selector::Todo(vec!["DONE".into()])),
            SuperGroupRule::discard(Selector::Level(1)).with_order(0),
        ];
        let groups = RuleListClassifier::new(rules).classify(&entries(), &GroupContext::on(today()));
        assert_eq!(names(&groups), vec!["Other items"]);
        assert_eq!(
            titles(&groups[0]),
            vec!["Quarterly report", "Tidy inbox", "Book travel"]
        );
    }

    #[test]
    fn auto_selector_expands_in_place() {
        let rules = vec![
            SuperGroupRule::new("Due today", Selector::Deadline(When::Today)),
            SuperGroupRule::unnamed(Selector::AutoCategory),
        ];
        let groups = RuleListClassifier::new(rules).classify(&entries(), &GroupContext::on(today()));
        assert_eq!(names(&groups), vec!["Due today", "home", "work"]);
        assert_eq!(titles(&groups[0]), vec!["Pay rent"]);
    }

    #[test]
    fn order_field_moves_groups() {
        let rules = vec![
            SuperGroupRule::new("Later", Selector::Scheduled(When::Future)).with_order(10),
            SuperGroupRule::new("Next", Selector::Todo(vec!["NEXT".into()])),
        ];
        let groups = RuleListClassifier::new(rules).classify(&entries(), &GroupContext::on(today()));
        assert_eq!(names(&groups), vec!["Next", "Later", "Other items"]);
    }

    #[test]
    fn rules_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Config {
            super_groups: Vec<SuperGroupRule>,
        }
        let config: Config = toml::from_str(
            r#"
            [[super_groups]]
            name = "Due soon"
            selector = { deadline = "future" }
            order = 1

            [[super_groups]]
            selector = { heading = "report" }

            [[super_groups]]
            selector = "auto_todo"
            "#,
        )
        .unwrap();
        assert_eq!(config.super_groups.len(), 3);
        assert_eq!(config.super_groups[0].selector, Selector::Deadline(When::Future));
        assert_eq!(config.super_groups[0].order, 1);
        assert_eq!(config.super_groups[2].selector, Selector::AutoTodo);

        let bad: Result<Config, _> = toml::from_str("[[super_groups]]\nselector = { heading = \"(\" }\n");
        assert!(bad.is_err());
    }

    #[test]
    fn unnamed_rules_describe_themselves() {
        assert_eq!(SuperGroupRule::unnamed(Selector::Deadline(When::Past)).group_name(), "Deadline past");
        assert_eq!(
            Selector::AnyOf(vec![Selector::Tag(vec!["a".into()]), Selector::Level(2)]).describe(),
            "a or Level 2"
        );
    }
}
