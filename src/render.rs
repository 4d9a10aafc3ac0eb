//! Fixed-width ASCII rendering of the packet layout.
//!
//! Each top-level field renders to one strip of cells. `|` opens a cell and
//! a cell for a field of size n spans n * 8 character columns, one column
//! per bit; labels sit centered between `.` fill. Rendering is a read-only
//! traversal and cannot fail on a valid tree.

use crate::ast::{Field, Packet};

/// Render the diagram, one line per top-level field.
pub fn render(packet: &Packet) -> Vec<String> {
    packet.fields.iter().map(render_field).collect()
}

/// Render the whole diagram as one newline-joined string.
pub fn render_to_string(packet: &Packet) -> String {
    render(packet).join("\n")
}

fn render_field(field: &Field) -> String {
    match field {
        Field::Simple { name, size, .. } => {
            format!("| {}", centered(name, *size))
        }
        Field::Array { name, children, .. } => {
            let total: u64 = children.iter().map(Field::size).sum();
            let mut out = String::from("| ");
            // most-significant element first: indices walk down from the
            // total size in element-size steps
            let mut index = total as i64 - 1;
            for child in children {
                out.push('|');
                let label = format!("{}[{}] = {}", name, index, child.name());
                out.push_str(&centered(&label, child.size()));
                index -= child.size() as i64;
            }
            out
        }
        Field::FlagGroup { children, .. } => {
            let names: Vec<&str> = children.iter().map(Field::name).collect();
            format!("| {}", names.join(" "))
        }
    }
}

/// Center `text` in a cell of `units * 8` columns: `.` fill of
/// `max(0, (width - len) / 2 - 2)` on each side around ` text `. The
/// division truncates, so an odd gap loses a column instead of rounding.
fn centered(text: &str, units: u64) -> String {
    let width = units as i64 * 8;
    let fill = ((width - text.len() as i64) / 2 - 2).max(0) as usize;
    let dots = ".".repeat(fill);
    format!("{} {} {}", dots, text, dots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Unit;

    #[test]
    fn centering_truncates_and_clamps() {
        // width 8, label 3: (8 - 3) / 2 - 2 = 0 fill
        assert_eq!(centered("pad", 1), " pad ");
        // width 16, label 7: (16 - 7) / 2 - 2 = 2 dots each side
        assert_eq!(centered("Version", 2), ".. Version ..");
        // label wider than the cell: fill clamps at zero
        assert_eq!(centered("Manufacturer", 1), " Manufacturer ");
        // zero-length marker
        assert_eq!(centered("ID", 0), " ID ");
    }

    #[test]
    fn simple_strip() {
        let field = Field::Simple {
            name: "pad".to_string(),
            size: 1,
            unit: Unit::Byte,
            literal: None,
        };
        let packet = Packet { fields: vec![field] };
        assert_eq!(render(&packet), vec!["|  pad "]);
    }

    #[test]
    fn array_strip_counts_indices_down() {
        let cell = |name: &str| Field::Simple {
            name: name.to_string(),
            size: 1,
            unit: Unit::Byte,
            literal: None,
        };
        let packet = Packet {
            fields: vec![Field::Array {
                name: "Port".to_string(),
                element_size: 1,
                children: vec![cell("byte"), cell("byte")],
            }],
        };
        assert_eq!(
            render(&packet),
            vec!["| | Port[1] = byte | Port[0] = byte "]
        );
    }

    #[test]
    fn flag_strip_lists_names_in_declaration_order() {
        let flag = |name: &str, width: u64| Field::Simple {
            name: name.to_string(),
            size: width,
            unit: Unit::Bit,
            literal: None,
        };
        let packet = Packet {
            fields: vec![Field::FlagGroup {
                name: "Flags".to_string(),
                children: vec![flag("Re", 2), flag("HW", 1), flag("DC", 2)],
            }],
        };
        assert_eq!(render(&packet), vec!["| Re HW DC"]);
    }

    #[test]
    fn rendering_is_pure() {
        let packet = Packet {
            fields: vec![Field::Simple {
                name: "OpCode".to_string(),
                size: 0,
                unit: Unit::Byte,
                literal: None,
            }],
        };
        assert_eq!(render(&packet), render(&packet));
    }
}
