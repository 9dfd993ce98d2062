use std::fmt;

use super::Numeric;
use crate::types::TypeCode;

/// A borrowed view of the raw data of a single row.
///
/// Numeric rows are viewed in native byte order, strings as their bytes, and a null row of a
/// nullable column as an empty view of kind [`TypeCode::Void`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ItemView<'a> {
    kind: TypeCode,
    data: &'a [u8],
}

impl<'a> ItemView<'a> {
    pub fn new(kind: TypeCode, data: &'a [u8]) -> Self {
        ItemView { kind, data }
    }

    pub fn null() -> Self {
        ItemView {
            kind: TypeCode::Void,
            data: &[],
        }
    }

    pub fn kind(&self) -> TypeCode {
        self.kind
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn is_null(&self) -> bool {
        self.kind == TypeCode::Void
    }

    /// The value of a numeric row, or `None` if this view is of a different kind.
    pub fn get<T: Numeric>(&self) -> Option<T> {
        if self.kind != T::CODE {
            return None;
        }
        bytemuck::try_pod_read_unaligned(self.data).ok()
    }

    /// The value of a string row, or `None` if this is not a string or not UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        if self.kind != TypeCode::String {
            return None;
        }
        std::str::from_utf8(self.data).ok()
    }
}

impl fmt::Debug for ItemView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemView")
            .field("kind", &self.kind)
            .field("data", &hex::encode(self.data))
            .finish()
    }
}
