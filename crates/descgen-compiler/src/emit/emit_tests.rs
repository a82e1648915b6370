use indoc::indoc;

use crate::emit::{Chunk, TableRow};
use crate::test_utils::{buffer_bytes, compile, first_buffer_bytes};
use crate::value::ByteValue;

const DEVICE: &str = indoc! {r#"
    <descriptor id="dev" type="0x01">
      <length name="bLength" />
      <type name="bDescriptorType" />
      <byte name="a">0x12</byte>
      <byte name="b">0x34</byte>
      <inendpoint name="ep" define="DEV_IN_ENDPOINT" />
    </descriptor>
"#};

#[test]
fn single_device_descriptor() {
    let resolved = compile(DEVICE);
    let table = resolved.table();

    assert_eq!(resolved.registry().get(resolved.registry().by_id("dev").unwrap()).index, 0);
    assert_eq!(first_buffer_bytes(&resolved), [4, 0x01, 0x12, 0x34, 0x80]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(
        table.rows[0],
        TableRow {
            descriptor_type: 1,
            index: 0,
            windex: 0,
            size: 5,
            buffer: Some("descriptor_dev".into()),
        }
    );
    assert_eq!(table.rows[0].type_index(), 0x0100);
    assert_eq!(table.rows[1], TableRow::SENTINEL);
    assert_eq!(table.endpoints.len(), 1);
    assert_eq!(table.endpoints[0].name, "DEV_IN_ENDPOINT");
    assert_eq!(table.endpoints[0].address, 0x80);
    assert_eq!(table.endpoint_count, 1);
}

#[test]
fn empty_input_has_only_the_sentinel() {
    let resolved = compile("<include>usb_hid.h</include>");
    let table = resolved.table();

    assert!(table.buffers.is_empty());
    assert_eq!(table.rows, [TableRow::SENTINEL]);
    assert_eq!(table.includes, ["usb_hid.h"]);
}

#[test]
fn children_are_nested_in_the_parent_buffer() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <length name="bLength" />
          <length name="wTotalLength" size="2" all="true" />
          <children type="4" />
        </descriptor>
        <descriptor id="if0" type="4" childof="cfg">
          <length name="bLength" />
          <byte name="bInterfaceNumber">0</byte>
        </descriptor>
        <descriptor id="if1" type="4" childof="cfg">
          <length name="bLength" />
          <byte name="bInterfaceNumber">1</byte>
        </descriptor>
    "#};

    let resolved = compile(input);
    let table = resolved.table();

    assert_eq!(table.buffers.len(), 1);
    // wTotalLength counts bLength and both interfaces, not itself
    assert_eq!(first_buffer_bytes(&resolved), [2, 5, 0, 1, 0, 1, 1]);
    let nested: Vec<&str> = table.buffers[0]
        .chunks
        .iter()
        .filter_map(|c| match c {
            Chunk::Nested { label, .. } => Some(label.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(nested, ["if0", "if1"]);
    assert_eq!(table.rows[0].size, 7);
}

#[test]
fn buffer_length_matches_children_sum() {
    let input = indoc! {r#"
        <descriptor id="hid" type="0x21">
          <length name="bLength" />
          <type name="bDescriptorType" />
          <word name="bcdHID">0x0111</word>
          <hidden name="report" size="2">sizeof(hid_report)</hidden>
          <string name="s">ab</string>
        </descriptor>
    "#};

    let resolved = compile(input);

    let bytes = first_buffer_bytes(&resolved);
    assert_eq!(bytes.len(), 1 + 1 + 2 + 4);
    assert_eq!(bytes[0] as usize, bytes.len() - 1);
}

#[test]
fn expressions_split_into_shifted_bytes() {
    let input = r#"<descriptor id="ep" type="5"><word name="wMaxPacketSize">USB_HID_ENDPOINT_SIZE</word></descriptor>"#;

    let resolved = compile(input);
    let bytes: Vec<_> = resolved.table().buffers[0].bytes().cloned().collect();

    assert_eq!(
        bytes,
        [
            ByteValue::Expr {
                expr: "USB_HID_ENDPOINT_SIZE".into(),
                shift: 0
            },
            ByteValue::Expr {
                expr: "USB_HID_ENDPOINT_SIZE".into(),
                shift: 8
            },
        ]
    );
}

#[test]
fn foreach_echoes_hidden_values() {
    let input = indoc! {r#"
        <descriptor id="cfg" type="2">
          <foreach type="0x24" unique="true"><echo name="bJackID" /></foreach>
          <foreach type="0x24"><echo name="bJackID" /></foreach>
        </descriptor>
        <descriptor type="0x24" childof="midi"><hidden name="bJackID">1</hidden></descriptor>
        <descriptor type="0x24" childof="midi"><hidden name="bJackID">2</hidden></descriptor>
        <descriptor type="0x24" childof="midi"><hidden name="bJackID">1</hidden></descriptor>
    "#};

    let resolved = compile(input);

    assert_eq!(first_buffer_bytes(&resolved), [1, 2, 1, 2, 1]);
}

#[test]
fn first_descriptor_gets_the_first_row_of_its_type() {
    let input = indoc! {r#"
        <descriptor id="product" type="3"><string>P</string></descriptor>
        <descriptor id="lang" type="3" first="true"><word>0x0409</word></descriptor>
    "#};

    let resolved = compile(input);
    let rows: Vec<_> = resolved
        .table()
        .descriptor_rows()
        .map(|r| (r.type_index(), r.buffer.clone().unwrap()))
        .collect();

    assert_eq!(
        rows,
        [
            (0x0300, "descriptor_lang".to_string()),
            (0x0301, "descriptor_product".to_string()),
        ]
    );
    assert_eq!(buffer_bytes(&resolved, 0), [0x09, 0x04]);
}

#[test]
fn windex_and_anonymous_names() {
    let input = r#"<descriptor type="0x22" wIndex="1"><byte>5</byte></descriptor>"#;

    let resolved = compile(input);
    let row = &resolved.table().rows[0];

    assert_eq!(row.windex, 1);
    assert_eq!(row.buffer.as_deref(), Some("descriptor_22_0"));
}

#[test]
fn ids_are_sanitized_for_c() {
    let resolved = compile(r#"<descriptor id="hid-report.1" type="0x22" />"#);

    assert_eq!(resolved.table().buffers[0].name, "descriptor_hid_report_1");
}

#[test]
fn includes_are_deduplicated() {
    let resolved = compile("<include>a.h</include>\n<include>b.h</include>\n<include>a.h</include>");

    assert_eq!(resolved.table().includes, ["a.h", "b.h"]);
}

#[test]
fn first_descriptor_of_a_later_type_keeps_type_order() {
    let input = indoc! {r#"
        <descriptor id="dev" type="1"><byte>1</byte></descriptor>
        <descriptor id="lang" type="3" first="true"><word>0x0409</word></descriptor>
    "#};

    let resolved = compile(input);
    let rows: Vec<u16> = resolved
        .table()
        .descriptor_rows()
        .map(TableRow::type_index)
        .collect();

    assert_eq!(rows, [0x0100, 0x0300]);
}
