//! Checked conversions between coordinate scalars and `f64`.
//!
//! Every determinant and Gram-system kernel works in `f64`. These helpers
//! convert in and out of the working precision and report the offending
//! coordinate instead of silently substituting a fallback value.

use num_traits::cast;

use crate::geometry::traits::coordinate::{CoordinateConversionError, CoordinateScalar};

fn cast_to_f64<T: CoordinateScalar>(
    value: T,
    coordinate_index: usize,
) -> Result<f64, CoordinateConversionError> {
    if !value.is_finite_generic() {
        return Err(CoordinateConversionError::NonFiniteValue {
            coordinate_index,
            coordinate_value: format!("{value:?}"),
        });
    }

    cast(value).ok_or_else(|| CoordinateConversionError::ConversionFailed {
        coordinate_index,
        coordinate_value: format!("{value:?}"),
        from_type: std::any::type_name::<T>(),
        to_type: "f64",
    })
}

fn cast_from_f64<T: CoordinateScalar>(
    value: f64,
    coordinate_index: usize,
) -> Result<T, CoordinateConversionError> {
    if !value.is_finite() {
        return Err(CoordinateConversionError::NonFiniteValue {
            coordinate_index,
            coordinate_value: format!("{value:?}"),
        });
    }

    let converted: T = cast(value).ok_or_else(|| CoordinateConversionError::ConversionFailed {
        coordinate_index,
        coordinate_value: format!("{value:?}"),
        from_type: "f64",
        to_type: std::any::type_name::<T>(),
    })?;

    // f64 -> f32 overflows to infinity rather than failing the cast.
    if converted.is_finite_generic() {
        Ok(converted)
    } else {
        Err(CoordinateConversionError::ConversionFailed {
            coordinate_index,
            coordinate_value: format!("{value:?}"),
            from_type: "f64",
            to_type: std::any::type_name::<T>(),
        })
    }
}

/// Convert every coordinate of an array to `f64`.
///
/// # Errors
///
/// Returns `CoordinateConversionError::NonFiniteValue` for NaN or infinite
/// coordinates and `CoordinateConversionError::ConversionFailed` when the
/// cast itself fails.
///
/// ```
/// use dewall::geometry::util::safe_coords_to_f64;
///
/// let coords = safe_coords_to_f64([1.5f32, 2.5, 3.5]).unwrap();
/// assert_eq!(coords, [1.5f64, 2.5, 3.5]);
/// assert!(safe_coords_to_f64([0.0f64, f64::NAN]).is_err());
/// ```
pub fn safe_coords_to_f64<T: CoordinateScalar, const D: usize>(
    coords: [T; D],
) -> Result<[f64; D], CoordinateConversionError> {
    let mut result = [0.0_f64; D];
    for (i, &coord) in coords.iter().enumerate() {
        result[i] = cast_to_f64(coord, i)?;
    }
    Ok(result)
}

/// Convert an `f64` array back to the coordinate scalar.
///
/// # Errors
///
/// Returns a `CoordinateConversionError` if any value is non-finite or does
/// not fit the target type.
///
/// ```
/// use dewall::geometry::util::safe_coords_from_f64;
///
/// let coords: [f32; 2] = safe_coords_from_f64([0.5, -2.0]).unwrap();
/// assert_eq!(coords, [0.5f32, -2.0]);
/// ```
pub fn safe_coords_from_f64<T: CoordinateScalar, const D: usize>(
    coords: [f64; D],
) -> Result<[T; D], CoordinateConversionError> {
    let mut result = [T::zero(); D];
    for (i, &coord) in coords.iter().enumerate() {
        result[i] = cast_from_f64(coord, i)?;
    }
    Ok(result)
}

/// Convert a single scalar to `f64`.
///
/// # Errors
///
/// Same conditions as [`safe_coords_to_f64`].
pub fn safe_scalar_to_f64<T: CoordinateScalar>(value: T) -> Result<f64, CoordinateConversionError> {
    cast_to_f64(value, 0)
}

/// Convert a single `f64` to the coordinate scalar.
///
/// # Errors
///
/// Same conditions as [`safe_coords_from_f64`].
///
/// ```
/// use dewall::geometry::util::safe_scalar_from_f64;
///
/// let v: f32 = safe_scalar_from_f64(0.25).unwrap();
/// assert_eq!(v, 0.25f32);
/// assert!(safe_scalar_from_f64::<f32>(1e300).is_err());
/// ```
pub fn safe_scalar_from_f64<T: CoordinateScalar>(
    value: f64,
) -> Result<T, CoordinateConversionError> {
    cast_from_f64(value, 0)
}

/// Convert a count or index to the coordinate scalar without losing precision.
///
/// Values above `2^min(53, mantissa_digits(T)) - 1` are rejected because they
/// are no longer exactly representable.
///
/// # Errors
///
/// Returns `CoordinateConversionError::ConversionFailed` if the value would
/// lose precision.
///
/// ```
/// use dewall::geometry::util::safe_usize_to_scalar;
///
/// let v: f64 = safe_usize_to_scalar(42).unwrap();
/// assert_eq!(v, 42.0);
/// assert!(safe_usize_to_scalar::<f32>(1 << 25).is_err());
/// ```
pub fn safe_usize_to_scalar<T: CoordinateScalar>(
    value: usize,
) -> Result<T, CoordinateConversionError> {
    const F64_MANTISSA_BITS: u32 = 53;
    let max_precise_bits = F64_MANTISSA_BITS.min(T::mantissa_digits());
    let max_precise: u128 = (1u128 << max_precise_bits) - 1;

    let failed = || CoordinateConversionError::ConversionFailed {
        coordinate_index: 0,
        coordinate_value: format!("{value}"),
        from_type: "usize",
        to_type: std::any::type_name::<T>(),
    };

    let wide = u64::try_from(value).map_err(|_| failed())?;
    if u128::from(wide) > max_precise {
        return Err(failed());
    }

    let as_f64: f64 = cast(value).ok_or_else(failed)?;
    safe_scalar_from_f64(as_f64)
}
