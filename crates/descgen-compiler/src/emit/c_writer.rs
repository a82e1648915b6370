//! C source, header, and make dependency writers.

use std::fmt::Write;

use super::{Buffer, Chunk, DescriptorTable, TableRow};

pub const BANNER: &str = "/* Generated by descgen. Do not edit. */";

/// Name of the emitted descriptor table.
pub const TABLE_NAME: &str = "usb_descriptors";

/// Header that declares `USBDescriptorEntry`.
const APP_HEADER: &str = "usb_app.h";

const INDENT: &str = "    ";
const BYTES_PER_LINE: usize = 8;

/// The generated `.c` file: buffers, then the table.
pub fn write_source(table: &DescriptorTable) -> String {
    let mut out = String::new();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "#include \"{APP_HEADER}\"").unwrap();
    for include in &table.includes {
        writeln!(out, "#include \"{include}\"").unwrap();
    }

    for buffer in &table.buffers {
        writeln!(out).unwrap();
        write_buffer(&mut out, buffer);
    }

    writeln!(out).unwrap();
    writeln!(out, "const USBDescriptorEntry {TABLE_NAME}[] = {{").unwrap();
    for row in &table.rows {
        let blank = table
            .buffers
            .iter()
            .any(|b| Some(&b.name) == row.buffer.as_ref() && is_blank(&b.chunks));
        write_row(&mut out, row, blank);
    }
    writeln!(out, "}};").unwrap();
    out
}

/// The generated header: endpoint defines and the table declaration.
pub fn write_header(table: &DescriptorTable, guard: &str) -> String {
    let mut out = String::new();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "#include \"{APP_HEADER}\"").unwrap();
    writeln!(out).unwrap();
    for endpoint in &table.endpoints {
        writeln!(out, "#define {} {:#04x}", endpoint.name, endpoint.address).unwrap();
    }
    if !table.endpoints.is_empty() {
        writeln!(out).unwrap();
    }
    writeln!(out, "#define USB_NUM_ENDPOINTS {}", table.endpoint_count).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "extern const USBDescriptorEntry {TABLE_NAME}[];").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "#endif /* {guard} */").unwrap();
    out
}

/// A make rule so the generated files rebuild when an input changes.
pub fn write_deps<'a>(targets: &[&str], inputs: impl IntoIterator<Item = &'a str>) -> String {
    let targets: Vec<String> = targets.iter().map(|t| escape_make(t)).collect();
    let mut out = format!("{}:", targets.join(" "));
    for input in inputs {
        out.push(' ');
        out.push_str(&escape_make(input));
    }
    out.push('\n');
    out
}

/// Include guard for a header path: `build/usb_descriptors.h` becomes
/// `_USB_DESCRIPTORS_H_`.
pub fn header_guard(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let body: String = file
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("_{body}_")
}

fn write_buffer(out: &mut String, buffer: &Buffer) {
    writeln!(out, "/* {} */", buffer.label).unwrap();
    // C before C23 rejects `= {}`; the row reports size 0 for these.
    if is_blank(&buffer.chunks) {
        writeln!(out, "static const uint8_t {}[1] = {{ 0x00 }};", buffer.name).unwrap();
        return;
    }
    writeln!(out, "static const uint8_t {}[] = {{", buffer.name).unwrap();
    write_chunks(out, &buffer.chunks, 1);
    writeln!(out, "}};").unwrap();
}

fn write_chunks(out: &mut String, chunks: &[Chunk], depth: usize) {
    let indent = INDENT.repeat(depth);
    for chunk in chunks {
        match chunk {
            Chunk::Field { name, bytes } => {
                for (i, line) in bytes.chunks(BYTES_PER_LINE).enumerate() {
                    let joined: Vec<String> = line.iter().map(ToString::to_string).collect();
                    write!(out, "{indent}{},", joined.join(", ")).unwrap();
                    if let (0, Some(name)) = (i, name) {
                        write!(out, " /* {name} */").unwrap();
                    }
                    writeln!(out).unwrap();
                }
            }
            Chunk::Raw(text) => {
                for line in raw_lines(text) {
                    if line.is_empty() {
                        writeln!(out).unwrap();
                    } else {
                        writeln!(out, "{indent}{line}").unwrap();
                    }
                }
            }
            Chunk::Nested { label, chunks } => {
                writeln!(out, "{indent}/* begin {label} */").unwrap();
                write_chunks(out, chunks, depth + 1);
                writeln!(out, "{indent}/* end {label} */").unwrap();
            }
        }
    }
}

/// True when a buffer's initializer would have no C text at all.
fn is_blank(chunks: &[Chunk]) -> bool {
    chunks.iter().all(|chunk| match chunk {
        Chunk::Field { bytes, .. } => bytes.is_empty(),
        Chunk::Raw(text) => raw_lines(text).next().is_none(),
        Chunk::Nested { chunks, .. } => is_blank(chunks),
    })
}

/// Lines of raw text as written, minus the blank lines around it, the
/// indentation its lines share, and trailing whitespace.
fn raw_lines(text: &str) -> impl Iterator<Item = &str> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |e| e + 1);
    let body = &lines[start..end.max(start)];
    let indent = body
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| l.get(indent..).unwrap_or(l))
        .collect::<Vec<_>>()
        .into_iter()
}

fn write_row(out: &mut String, row: &TableRow, blank: bool) {
    match &row.buffer {
        Some(buffer) if blank => writeln!(
            out,
            "{INDENT}{{ {:#06x}, {:#06x}, 0, {buffer} }},",
            row.type_index(),
            row.windex
        ),
        Some(buffer) => writeln!(
            out,
            "{INDENT}{{ {:#06x}, {:#06x}, sizeof({buffer}), {buffer} }},",
            row.type_index(),
            row.windex
        ),
        None => writeln!(out, "{INDENT}{{ 0x0000, 0x0000, 0, NULL }},"),
    }
    .unwrap();
}

fn escape_make(path: &str) -> String {
    path.replace(' ', "\\ ")
}
