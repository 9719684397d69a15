// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::error::{CoreError, CoreResult};
use plaidml_sys as sys;
use std::fmt;
use std::str::FromStr;

/// Scalar element kinds understood by the engine.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DType {
    #[default]
    Invalid = sys::PLAIDML_DATA_INVALID,
    Boolean = sys::PLAIDML_DATA_BOOLEAN,
    Int8 = sys::PLAIDML_DATA_INT8,
    UInt8 = sys::PLAIDML_DATA_UINT8,
    Int16 = sys::PLAIDML_DATA_INT16,
    UInt16 = sys::PLAIDML_DATA_UINT16,
    Int32 = sys::PLAIDML_DATA_INT32,
    UInt32 = sys::PLAIDML_DATA_UINT32,
    Int64 = sys::PLAIDML_DATA_INT64,
    UInt64 = sys::PLAIDML_DATA_UINT64,
    BFloat16 = sys::PLAIDML_DATA_BFLOAT16,
    Float16 = sys::PLAIDML_DATA_FLOAT16,
    Float32 = sys::PLAIDML_DATA_FLOAT32,
    Float64 = sys::PLAIDML_DATA_FLOAT64,
}

impl DType {
    pub const ALL: [DType; 14] = [
        DType::Invalid,
        DType::Boolean,
        DType::Int8,
        DType::UInt8,
        DType::Int16,
        DType::UInt16,
        DType::Int32,
        DType::UInt32,
        DType::Int64,
        DType::UInt64,
        DType::BFloat16,
        DType::Float16,
        DType::Float32,
        DType::Float64,
    ];

    /// Converts an engine datatype code.
    pub fn from_raw(code: sys::plaidml_datatype) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|dtype| dtype.as_raw() == code)
            .ok_or(CoreError::UnknownDType(code))
    }

    pub fn as_raw(self) -> sys::plaidml_datatype {
        self as sys::plaidml_datatype
    }

    /// Bytes per element; zero for `Invalid`.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::Invalid => 0,
            DType::Boolean | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 | DType::BFloat16 | DType::Float16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DType::BFloat16 | DType::Float16 | DType::Float32 | DType::Float64
        )
    }

    pub fn is_signed(self) -> bool {
        self.is_float() || matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Invalid => "invalid",
            DType::Boolean => "bool",
            DType::Int8 => "i8",
            DType::UInt8 => "u8",
            DType::Int16 => "i16",
            DType::UInt16 => "u16",
            DType::Int32 => "i32",
            DType::UInt32 => "u32",
            DType::Int64 => "i64",
            DType::UInt64 => "u64",
            DType::BFloat16 => "bf16",
            DType::Float16 => "f16",
            DType::Float32 => "f32",
            DType::Float64 => "f64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let alias = match lowered.as_str() {
            "boolean" => "bool",
            "int8" => "i8",
            "uint8" => "u8",
            "int16" => "i16",
            "uint16" => "u16",
            "int32" => "i32",
            "uint32" => "u32",
            "int64" => "i64",
            "uint64" => "u64",
            "bfloat16" => "bf16",
            "float16" | "half" => "f16",
            "float32" | "float" => "f32",
            "float64" | "double" => "f64",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|dtype| dtype.name() == alias)
            .ok_or_else(|| CoreError::UnknownDTypeName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_follow_the_c_enum() {
        for (index, dtype) in DType::ALL.into_iter().enumerate() {
            assert_eq!(dtype.as_raw(), index as i32);
            assert_eq!(DType::from_raw(dtype.as_raw()).unwrap(), dtype);
        }
        assert!(matches!(
            DType::from_raw(99),
            Err(CoreError::UnknownDType(99))
        ));
    }

    #[test]
    fn element_sizes() {
        assert_eq!(DType::Invalid.size_in_bytes(), 0);
        assert_eq!(DType::Boolean.size_in_bytes(), 1);
        assert_eq!(DType::BFloat16.size_in_bytes(), 2);
        assert_eq!(DType::Float32.size_in_bytes(), 4);
        assert_eq!(DType::UInt64.size_in_bytes(), 8);
    }

    #[test]
    fn names_parse_back() {
        for dtype in DType::ALL {
            assert_eq!(dtype.to_string().parse::<DType>().unwrap(), dtype);
        }
        assert_eq!("FLOAT32".parse::<DType>().unwrap(), DType::Float32);
        assert_eq!(" half ".parse::<DType>().unwrap(), DType::Float16);
        assert!("complex64".parse::<DType>().is_err());
    }

    #[test]
    fn signedness() {
        assert!(DType::Int8.is_signed());
        assert!(DType::Float16.is_signed());
        assert!(!DType::UInt32.is_signed());
        assert!(!DType::Boolean.is_float());
    }
}
