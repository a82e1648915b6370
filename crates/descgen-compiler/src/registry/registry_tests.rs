use indoc::indoc;

use crate::registry::EndpointAllocator;
use crate::test_utils::{comment, index};
use crate::{CompileBuilder, Error};

fn labels(indexed: &crate::Indexed, descriptor_type: u8) -> Vec<String> {
    let registry = indexed.registry();
    registry
        .of_type(descriptor_type)
        .iter()
        .map(|&d| registry.get(d).label())
        .collect()
}

#[test]
fn indices_are_dense_per_type() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1" />
        <descriptor id="s0" type="3" />
        <descriptor id="cfg" type="2" />
        <descriptor id="s1" type="3" />
        <descriptor id="s2" type="3" />
    "#};

    let indexed = index(input);
    let registry = indexed.registry();

    for descriptor_type in [1, 2, 3] {
        let indices: Vec<u32> = registry
            .of_type(descriptor_type)
            .iter()
            .map(|&d| registry.get(d).index)
            .collect();
        let expected: Vec<u32> = (0..indices.len() as u32).collect();
        assert_eq!(indices, expected);
    }
    assert_eq!(labels(&indexed, 3), ["s0", "s1", "s2"]);
    assert_eq!(registry.get(registry.by_id("s2").unwrap()).index, 2);
}

#[test]
fn first_descriptors_are_indexed_ahead() {
    let input = indoc! {r#"
        <descriptor id="product" type="3" />
        <descriptor id="vendor" type="3" />
        <descriptor id="lang" type="3" first="true" />
    "#};

    let indexed = index(input);

    assert_eq!(labels(&indexed, 3), ["lang", "product", "vendor"]);
}

#[test]
fn top_holds_only_top_level_descriptors() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2" />
        <descriptor id="iface0" type="4" childof="cfg" />
        <descriptor id="iface1" type="4" childof="cfg" />
        <descriptor id="other" type="4" childof="elsewhere" />
    "#};

    let indexed = index(input);
    let registry = indexed.registry();
    let top: Vec<(u8, usize)> = registry.top().map(|(t, ids)| (t, ids.len())).collect();

    assert_eq!(top, [(2, 1)]);
    let cfg_children: Vec<_> = registry
        .children_of(4, Some("cfg"))
        .into_iter()
        .map(|d| registry.get(d).label())
        .collect();
    assert_eq!(cfg_children, ["iface0", "iface1"]);
    assert!(registry.children_of(4, None).is_empty());
}

#[test]
fn anonymous_descriptors_get_type_labels() {
    let indexed = index("<descriptor type=\"3\" />\n<descriptor type=\"3\" />");
    let registry = indexed.registry();

    assert_eq!(labels(&indexed, 3), ["0x03#0", "0x03#1"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn duplicate_descriptor_id() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1" />
        <descriptor id="dev" type="2" />
    "#};
    let err = CompileBuilder::inline(&comment(input))
        .parse()
        .unwrap()
        .index()
        .unwrap_err();

    let Error::DuplicateId {
        id,
        location,
        previous,
    } = err.clone()
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(id, "dev");
    assert_eq!(previous.line, 2);
    assert_eq!(location.line, 3);
}

#[test]
fn duplicate_id_on_content_node() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1">
          <byte id="dev">1</byte>
        </descriptor>
    "#};
    let err = CompileBuilder::inline(&comment(input))
        .parse()
        .unwrap()
        .index()
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateId { .. }));
}

#[test]
fn expect_exactly_one() {
    let indexed = index("<descriptor type=\"1\" />\n<descriptor type=\"3\" />\n<descriptor type=\"3\" />");
    let registry = indexed.registry();

    assert!(registry.expect_exactly_one(1).is_ok());
    insta::assert_snapshot!(
        registry.expect_exactly_one(3).unwrap_err(),
        @"expected exactly one descriptor of type 0x03, found 2"
    );
    assert_eq!(
        registry.expect_exactly_one(2).unwrap_err(),
        Error::ExpectedExactlyOneOfType {
            descriptor_type: 2,
            found: 0
        }
    );
}

#[test]
fn require_one_policy_runs_at_index_time() {
    let err = CompileBuilder::inline(&comment("<descriptor type=\"2\" />"))
        .require_exactly_one(1)
        .parse()
        .unwrap()
        .index()
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ExpectedExactlyOneOfType {
            descriptor_type: 1,
            found: 0
        }
    ));
}

#[test]
fn allocator_counts_up_to_max() {
    let mut endpoints = EndpointAllocator::new(3);

    assert_eq!(endpoints.reserve(), Some(0));
    assert_eq!(endpoints.reserve(), Some(1));
    assert_eq!(endpoints.reserve(), Some(2));
    assert_eq!(endpoints.reserve(), None);
    assert_eq!(endpoints.allocated(), 3);
}

#[test]
fn allocator_with_no_endpoints() {
    let mut endpoints = EndpointAllocator::new(0);

    assert_eq!(endpoints.reserve(), None);
}

#[test]
fn allocator_stays_below_the_direction_bit() {
    let mut endpoints = EndpointAllocator::new(u8::MAX);

    assert_eq!(endpoints.max(), 0x80);
    let numbers: Vec<u8> = std::iter::from_fn(|| endpoints.reserve()).collect();
    assert_eq!(numbers.len(), 0x80);
    assert_eq!(numbers.last(), Some(&0x7f));
}

#[test]
fn first_does_not_reorder_types() {
    let indexed = index(indoc! {r#"
        <descriptor id="dev" type="1" />
        <descriptor id="product" type="3" />
        <descriptor id="lang" type="3" first="true" />
    "#});

    let types: Vec<u8> = indexed.registry().types().map(|(t, _)| t).collect();
    let top: Vec<u8> = indexed.registry().top().map(|(t, _)| t).collect();

    assert_eq!(types, [1, 3]);
    assert_eq!(top, [1, 3]);
    assert_eq!(labels(&indexed, 3), ["lang", "product"]);
}
