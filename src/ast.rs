//! Packet layout tree assembled from the token stream.

/// Unit a field's size is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Byte,
    Bit,
}

/// One node in the packet layout. A closed set: only the container variants
/// carry children, so a leaf can never grow any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A named unit with a fixed extent. A bare name in the notation is a
    /// zero-length marker; sized leaves come from `+0` padding and flag
    /// group members.
    Simple {
        name: String,
        size: u64,
        unit: Unit,
        /// Attached string annotation (`Name:"..."`), e.g. a magic value.
        literal: Option<String>,
    },
    /// A fixed number of repeated same-sized elements. Elements declared
    /// only by count (`Name[n]`) are uniform one-byte cells named `byte`.
    Array {
        name: String,
        element_size: u64,
        children: Vec<Field>,
    },
    /// Sub-byte flags packed together; child sizes are bit-widths.
    FlagGroup { name: String, children: Vec<Field> },
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Simple { name, .. } | Field::Array { name, .. } | Field::FlagGroup { name, .. } => {
                name
            }
        }
    }

    /// Size in the field's own unit: bytes for `Simple` and `Array`, bits
    /// for `FlagGroup`. Containers sum their children.
    pub fn size(&self) -> u64 {
        match self {
            Field::Simple { size, .. } => *size,
            Field::Array { children, .. } | Field::FlagGroup { children, .. } => {
                children.iter().map(Field::size).sum()
            }
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Field::Simple { unit, .. } => *unit,
            Field::Array { .. } => Unit::Byte,
            Field::FlagGroup { .. } => Unit::Bit,
        }
    }

    /// Whole-byte footprint in the layout. Bit-sized fields round up to the
    /// next byte boundary.
    pub fn byte_len(&self) -> u64 {
        match self.unit() {
            Unit::Byte => self.size(),
            Unit::Bit => {
                let bits = self.size();
                bits / 8 + u64::from(bits % 8 > 0)
            }
        }
    }
}

/// Root of one parsed notation: the top-level fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    pub fields: Vec<Field>,
}

impl Packet {
    /// Total byte footprint of the packet.
    pub fn byte_len(&self) -> u64 {
        self.fields.iter().map(Field::byte_len).sum()
    }
}
