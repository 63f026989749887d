//! Configuration file tests

use sidebar_doc::Depth;
use sidebar_group::{Selector, SuperGroupRule, When};
use sidebar_view::{DefaultFn, Side, SidebarConfig, SidebarError};
use std::io::Write;

#[test]
fn loads_partial_file_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
default_fns = ["todo"]
group = true

[[super_groups]]
name = "Overdue"
selector = {{ deadline = "past" }}

[[super_groups]]
selector = "auto_category"
order = 5

[placement]
side = "left"

[tree]
default_depth = "branches"
"#
    )
    .unwrap();

    let config = SidebarConfig::load(file.path()).unwrap();
    assert_eq!(config.default_fns, vec![DefaultFn::Todo]);
    assert_eq!(
        config.super_groups,
        Some(vec![
            SuperGroupRule::new("Overdue", Selector::Deadline(When::Past)),
            SuperGroupRule::unnamed(Selector::AutoCategory).with_order(5),
        ])
    );
    assert_eq!(config.placement.side, Side::Left);
    assert_eq!(config.placement.width, 40);
    assert_eq!(config.tree.default_depth, Some(Depth::Branches));
    assert_eq!(config.tree.mirror_prefix, "<tree>");
    assert_eq!(config.formatter.category_width, 12);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SidebarConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SidebarError::Io(_)));
}

#[test]
fn malformed_file_is_toml_error() {
    let err = SidebarConfig::from_toml_str("group = \"yes\"").unwrap_err();
    assert!(matches!(err, SidebarError::Toml(_)));
}

#[test]
fn builders_override_defaults() {
    let config = SidebarConfig::new()
        .with_group(false)
        .with_default_fns(vec![DefaultFn::Upcoming]);
    assert!(!config.group);
    assert_eq!(config.default_fns, vec![DefaultFn::Upcoming]);
    assert!(config.validate().is_ok());
}
