use indoc::indoc;

use crate::resolve::Resolution;
use crate::test_utils::{comment, compile, compile_err, first_buffer_bytes};
use crate::tree::NodeId;
use crate::{CompileBuilder, Error, Resolved};

/// Resolution of the child named `name` anywhere in the forest.
fn resolution_of<'r>(resolved: &'r Resolved, name: &str) -> &'r Resolution {
    let node = named(resolved, name);
    resolved.resolutions().get(node)
}

fn named(resolved: &Resolved, name: &str) -> NodeId {
    resolved
        .forest()
        .iter()
        .find(|(_, n)| n.name.as_deref() == Some(name))
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

#[test]
fn every_slot_is_filled() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <length name="bLength" />
          <children type="4" />
        </descriptor>
        <descriptor id="if0" type="4" childof="cfg">
          <hidden name="hid" size="2">0x1234</hidden>
          <raw>EXTRA</raw>
        </descriptor>
    "#};

    let resolved = compile(input);

    assert!(resolved.resolutions().is_complete());
}

#[test]
fn length_excludes_itself_and_children_unless_all() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <length name="bLength" />
          <type name="bDescriptorType" />
          <length name="wTotalLength" size="2" all="true" />
          <children type="4" />
        </descriptor>
        <descriptor id="if0" type="4" childof="cfg">
          <length name="ifLength" />
          <byte>0</byte>
          <byte>1</byte>
        </descriptor>
    "#};

    let resolved = compile(input);

    // type (1) + wTotalLength (2)
    assert_eq!(resolution_of(&resolved, "bLength"), &Resolution::Value(3));
    // bLength (1) + type (1) + if0 (3)
    assert_eq!(resolution_of(&resolved, "wTotalLength"), &Resolution::Value(5));
    assert_eq!(resolution_of(&resolved, "ifLength"), &Resolution::Value(2));
}

#[test]
fn length_ignores_hidden_and_raw() {
    let input = indoc! {r#"
        <descriptor id="d" type="0x21">
          <length name="bLength" />
          <hidden name="h" size="4">0xdeadbeef</hidden>
          <raw>EXTRA_BYTES</raw>
          <string>ab</string>
        </descriptor>
    "#};

    let resolved = compile(input);

    assert_eq!(resolution_of(&resolved, "bLength"), &Resolution::Value(4));
}

#[test]
fn forward_references_resolve() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1">
          <ref name="iProduct" refid="product" type="3" />
          <ref name="iVendor" refid="vendor" />
        </descriptor>
        <descriptor id="lang" type="3" first="true" />
        <descriptor id="vendor" type="3" />
        <descriptor id="product" type="3" />
    "#};

    let resolved = compile(input);

    assert_eq!(resolution_of(&resolved, "iVendor"), &Resolution::Value(1));
    assert_eq!(resolution_of(&resolved, "iProduct"), &Resolution::Value(2));
}

#[test]
fn missing_reference() {
    let err = compile_err(r#"<descriptor type="1"><ref refid="nowhere" /></descriptor>"#);

    insta::assert_snapshot!(err, @"reference to undefined descriptor `nowhere`");
}

#[test]
fn reference_type_mismatch() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1">
          <ref refid="cfg" type="3" />
        </descriptor>
        <descriptor id="cfg" type="2" />
    "#};

    let err = compile_err(input);

    insta::assert_snapshot!(err, @"`cfg` is a descriptor of type 0x02, expected 0x03");
}

#[test]
fn count_associated_and_global() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <count name="bNumInterfaces" type="4" associated="true" />
          <count name="allInterfaces" type="4" />
        </descriptor>
        <descriptor id="if0" type="4" childof="cfg" />
        <descriptor id="if1" type="4" childof="cfg" />
        <descriptor id="stray" type="4" childof="other" />
    "#};

    let resolved = compile(input);

    assert_eq!(resolution_of(&resolved, "bNumInterfaces"), &Resolution::Value(2));
    assert_eq!(resolution_of(&resolved, "allInterfaces"), &Resolution::Value(3));
}

#[test]
fn index_and_type_fields() {
    let input = indoc! {r#"
        <descriptor type="4"><index name="first" /></descriptor>
        <descriptor type="4"><index name="second" size="2" /><type name="t" size="2" /></descriptor>
    "#};

    let resolved = compile(input);

    assert_eq!(resolution_of(&resolved, "first"), &Resolution::Value(0));
    assert_eq!(resolution_of(&resolved, "second"), &Resolution::Value(1));
    assert_eq!(resolution_of(&resolved, "t"), &Resolution::Value(4));
}

#[test]
fn endpoints_allocate_in_traversal_order() {
    let input = indoc! {r#"
        <descriptor id="a" type="5">
          <inendpoint name="epA" />
        </descriptor>
        <descriptor id="b" type="5">
          <outendpoint name="epB" />
          <inendpoint name="epC" />
        </descriptor>
    "#};

    let resolved = compile(input);

    assert_eq!(resolution_of(&resolved, "epA"), &Resolution::Address(0x80));
    assert_eq!(resolution_of(&resolved, "epB"), &Resolution::Address(0x01));
    assert_eq!(resolution_of(&resolved, "epC"), &Resolution::Address(0x82));
    assert_eq!(resolved.resolutions().endpoints_allocated(), 3);
}

#[test]
fn ninth_endpoint_is_exhausted() {
    let err = CompileBuilder::inline(&comment(&in_endpoints(9)))
        .with_max_endpoints(8)
        .compile()
        .unwrap_err();

    let Error::EndpointsExhausted { max, location } = err.clone() else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(max, 8);
    // ninth <inendpoint>: markup line 10, source line 11
    assert_eq!(location.line, 11);
}

fn in_endpoints(count: usize) -> String {
    let mut input = String::from("<descriptor id=\"hog\" type=\"5\">\n");
    for _ in 0..count {
        input.push_str("  <inendpoint />\n");
    }
    input.push_str("</descriptor>\n");
    input
}

#[test]
fn eight_in_endpoints_fill_the_default_range() {
    let resolved = compile(&in_endpoints(8));

    assert_eq!(
        first_buffer_bytes(&resolved),
        [0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87]
    );
    assert_eq!(resolved.resolutions().endpoints_allocated(), 8);
}

#[test]
fn endpoint_limit_is_capped_below_the_direction_bit() {
    let err = CompileBuilder::inline(&comment(&in_endpoints(129)))
        .with_max_endpoints(u8::MAX)
        .compile()
        .unwrap_err();

    assert!(matches!(err, Error::EndpointsExhausted { max: 0x80, .. }));
}

#[test]
fn endpoint_limit_is_configurable() {
    let input = "<descriptor type=\"5\"><inendpoint /><inendpoint /></descriptor>";

    let err = CompileBuilder::inline(&comment(input))
        .with_max_endpoints(1)
        .compile()
        .unwrap_err();

    insta::assert_snapshot!(err, @"all 1 endpoint addresses are already allocated");
}

#[test]
fn foreach_matches_and_unique() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <foreach name="jacks" type="0x24" unique="true"><echo name="bJackID" /></foreach>
          <foreach name="all" type="0x24"><echo name="bJackID" /></foreach>
        </descriptor>
        <descriptor type="0x24"><hidden name="bJackID">1</hidden></descriptor>
        <descriptor type="0x24"><hidden name="bJackID">2</hidden></descriptor>
        <descriptor type="0x24"><hidden name="bJackID">1</hidden></descriptor>
        <descriptor type="0x24" />
    "#};

    let resolved = compile(input);
    let jacks = named(&resolved, "jacks");
    let all = named(&resolved, "all");

    assert_eq!(resolved.resolutions().matched(jacks).len(), 2);
    assert_eq!(resolved.resolutions().matched(all).len(), 3);
}

#[test]
fn length_too_large_for_field() {
    let mut input = String::from("<descriptor type=\"0x21\">\n  <length name=\"bLength\" />\n");
    input.push_str(&format!("  <string>{}</string>\n", "x".repeat(200)));
    input.push_str("</descriptor>\n");

    let err = compile_err(&input);

    insta::assert_snapshot!(err, @"length value 400 does not fit in 1 byte(s)");
}

#[test]
fn self_containing_descriptor_is_a_cycle() {
    let input = indoc! {r#"
        <descriptor id="loop" type="4" childof="loop">
          <length name="bLength" all="true" />
          <children type="4" />
        </descriptor>
    "#};

    let err = compile_err(input);

    insta::assert_snapshot!(err, @"descriptor `loop` contains itself");
}

#[test]
fn mutual_containment_is_a_cycle() {
    let input = indoc! {r#"
        <descriptor id="a" type="4" childof="b" top="true">
          <children type="5" />
        </descriptor>
        <descriptor id="b" type="5" childof="a">
          <children type="4" />
        </descriptor>
    "#};

    let err = compile_err(input);

    assert!(matches!(err, Error::ReferenceCycle { .. }));
}
