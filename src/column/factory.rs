use super::{
    AnyColumn, ArrayColumn, Column, LowCardinalityColumn, Numeric, NullableColumn, NumericColumn,
    StringColumn, TupleColumn,
};
use crate::error::ColumnError;
use crate::types::{Type, TypeRef};

fn numeric<T: Numeric>(ty: &TypeRef) -> AnyColumn {
    NumericColumn::<T>::with_type(ty.clone()).into()
}

/// Create an empty column of type `ty`.
///
/// The column keeps `ty` itself (not a copy) as its type descriptor.
///
/// # Errors
/// [`ColumnError::UnsupportedOperation`] for a low cardinality type whose dictionary type is
/// neither numeric nor `String`.
pub fn create_column(ty: &TypeRef) -> Result<AnyColumn, ColumnError> {
    let column = match &**ty {
        Type::Int8 => numeric::<i8>(ty),
        Type::Int16 => numeric::<i16>(ty),
        Type::Int32 => numeric::<i32>(ty),
        Type::Int64 => numeric::<i64>(ty),
        Type::UInt8 => numeric::<u8>(ty),
        Type::UInt16 => numeric::<u16>(ty),
        Type::UInt32 => numeric::<u32>(ty),
        Type::UInt64 => numeric::<u64>(ty),
        Type::Float32 => numeric::<f32>(ty),
        Type::Float64 => numeric::<f64>(ty),
        Type::String => StringColumn::with_type(ty.clone()).into(),
        Type::Nullable(nested) => {
            NullableColumn::with_type(ty.clone(), create_column(nested)?).into()
        }
        Type::Array(item) => ArrayColumn::with_type(ty.clone(), create_column(item)?).into(),
        Type::Tuple(items) => {
            let columns = items
                .iter()
                .map(create_column)
                .collect::<Result<Vec<_>, _>>()?;
            TupleColumn::with_type(ty.clone(), columns).into()
        }
        Type::LowCardinality(_) => LowCardinalityColumn::with_type(ty.clone())?.into(),
    };
    Ok(column)
}

/// A column of type `ty` holding a single row with the default value of that type.
///
/// The default is zero for numbers, the empty string, null for nullable types, the empty
/// array, and a tuple of the element defaults.
pub fn default_row(ty: &TypeRef) -> Result<AnyColumn, ColumnError> {
    let mut column = create_column(ty)?;
    push_default(&mut column)?;
    Ok(column)
}

pub(crate) fn push_default(column: &mut AnyColumn) -> Result<(), ColumnError> {
    match column {
        AnyColumn::Int8(c) => c.push(0),
        AnyColumn::Int16(c) => c.push(0),
        AnyColumn::Int32(c) => c.push(0),
        AnyColumn::Int64(c) => c.push(0),
        AnyColumn::UInt8(c) => c.push(0),
        AnyColumn::UInt16(c) => c.push(0),
        AnyColumn::UInt32(c) => c.push(0),
        AnyColumn::UInt64(c) => c.push(0),
        AnyColumn::Float32(c) => c.push(0.0),
        AnyColumn::Float64(c) => c.push(0.0),
        AnyColumn::String(c) => c.push(""),
        AnyColumn::Nullable(c) => c.push_null()?,
        AnyColumn::Array(c) => c.push_empty(),
        AnyColumn::Tuple(c) => {
            for element in c.elements_mut() {
                push_default(element)?;
            }
        }
        AnyColumn::LowCardinality(c) => c.push_default(),
    }
    #[cfg(feature = "slow_path_assertions")]
    column.assert_invariants();
    debug_assert!(column.size() > 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::TypeCode;

    #[test]
    fn created_columns_share_the_descriptor() {
        let ty = Type::array(Type::nullable(Arc::new(Type::UInt16)));
        let col = create_column(&ty).unwrap();
        assert!(Arc::ptr_eq(col.type_ref(), &ty));
        assert!(col.is_empty());
        assert!(col.downcast_ref::<ArrayColumn>().is_some());
    }

    #[test]
    fn default_rows() {
        let ty = Type::tuple([
            Arc::new(Type::Int32),
            Type::string(),
            Type::nullable(Arc::new(Type::Float64)),
            Type::array(Type::string()),
        ]);
        let row = default_row(&ty).unwrap();
        assert_eq!(row.size(), 1);
        let tuple = row.downcast_ref::<TupleColumn>().unwrap();
        let get = |i: usize| tuple.element(i).unwrap();
        assert_eq!(get(0).get_item(0).unwrap().get::<i32>(), Some(0));
        assert_eq!(get(1).get_item(0).unwrap().as_str(), Some(""));
        assert_eq!(get(2).get_item(0).unwrap().kind(), TypeCode::Void);
        let array = get(3).downcast_ref::<ArrayColumn>().unwrap();
        assert_eq!(array.row_len(0), Some(0));
    }

    #[test]
    fn low_cardinality_of_composites_is_unsupported() {
        let ty = Type::low_cardinality(Type::array(Type::string()));
        assert!(matches!(
            create_column(&ty),
            Err(ColumnError::UnsupportedOperation { .. })
        ));
    }
}
