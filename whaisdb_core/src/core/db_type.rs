use std::fmt::Display;

/// Scalar type tag of a table field.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum FieldType {
    BOOL,
    CHAR,
    DATE,
    DATETIME,
    HIRESTIME,
    INT8,
    INT16,
    INT32,
    INT64,
    UINT8,
    UINT16,
    UINT32,
    UINT64,
    REAL,
    RICHREAL,
    TEXT,
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{:?}", self))
    }
}

impl FieldType {
    pub fn to_byte(&self) -> u8 {
        match self {
            FieldType::BOOL => 1,
            FieldType::CHAR => 2,
            FieldType::DATE => 3,
            FieldType::DATETIME => 4,
            FieldType::HIRESTIME => 5,
            FieldType::INT8 => 6,
            FieldType::INT16 => 7,
            FieldType::INT32 => 8,
            FieldType::INT64 => 9,
            FieldType::UINT8 => 10,
            FieldType::UINT16 => 11,
            FieldType::UINT32 => 12,
            FieldType::UINT64 => 13,
            FieldType::REAL => 14,
            FieldType::RICHREAL => 15,
            FieldType::TEXT => 16,
        }
    }

    pub fn from_byte(byte: u8) -> Option<FieldType> {
        match byte {
            1 => Some(FieldType::BOOL),
            2 => Some(FieldType::CHAR),
            3 => Some(FieldType::DATE),
            4 => Some(FieldType::DATETIME),
            5 => Some(FieldType::HIRESTIME),
            6 => Some(FieldType::INT8),
            7 => Some(FieldType::INT16),
            8 => Some(FieldType::INT32),
            9 => Some(FieldType::INT64),
            10 => Some(FieldType::UINT8),
            11 => Some(FieldType::UINT16),
            12 => Some(FieldType::UINT32),
            13 => Some(FieldType::UINT64),
            14 => Some(FieldType::REAL),
            15 => Some(FieldType::RICHREAL),
            16 => Some(FieldType::TEXT),
            _ => None,
        }
    }

    /// Fields of this type can be searched by value ranges.
    #[inline]
    pub fn is_filterable(&self) -> bool {
        !matches!(self, FieldType::TEXT)
    }
}

/// What a table reports about one of its fields.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub is_array: bool,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType) -> Self {
        FieldDescriptor {
            field_type,
            is_array: false,
        }
    }

    pub fn array_of(field_type: FieldType) -> Self {
        FieldDescriptor {
            field_type,
            is_array: true,
        }
    }
}
