// Trace value type

use serde::{Deserialize, Serialize};

use crate::core::constants::Encoding;

// Smallest magnitude that no longer fits a 32-bit signed integer
const INT_LIMIT: f32 = 2_147_483_648.0;

/// One captured signal: a title, a raw data blob and a sample vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub title: String,
    pub data: Vec<u8>,
    pub samples: Vec<f32>,
    pub sample_frequency: f32,
}

impl Trace {
    pub fn new(
        title: impl Into<String>,
        data: Vec<u8>,
        samples: Vec<f32>,
        sample_frequency: f32,
    ) -> Self {
        Self {
            title: title.into(),
            data,
            samples,
            sample_frequency,
        }
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// The narrowest encoding that can represent every sample: FLOAT as
    /// soon as a sample is non-integral or beyond the i32 range, otherwise
    /// BYTE, SHORT or INT by maximum magnitude.
    pub fn preferred_coding(&self) -> Encoding {
        let mut max_abs = 0.0f32;
        for &s in &self.samples {
            if s.fract() != 0.0 || s.abs() >= INT_LIMIT {
                return Encoding::Float;
            }
            max_abs = max_abs.max(s.abs());
        }
        if max_abs < 128.0 {
            Encoding::Byte
        } else if max_abs < 32768.0 {
            Encoding::Short
        } else {
            Encoding::Int
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coding_of(samples: &[f32]) -> Encoding {
        Trace::new("t", Vec::new(), samples.to_vec(), 1.0).preferred_coding()
    }

    #[test]
    fn test_preferred_coding_byte() {
        assert_eq!(coding_of(&[1.0, 2.0, 3.0]), Encoding::Byte);
        assert_eq!(coding_of(&[127.0, -127.0]), Encoding::Byte);
        assert_eq!(coding_of(&[]), Encoding::Byte);
    }

    #[test]
    fn test_preferred_coding_short() {
        assert_eq!(coding_of(&[128.0]), Encoding::Short);
        assert_eq!(coding_of(&[32767.0]), Encoding::Short);
    }

    #[test]
    fn test_preferred_coding_int() {
        assert_eq!(coding_of(&[32768.0]), Encoding::Int);
        assert_eq!(coding_of(&[1_000_000.0, -5.0]), Encoding::Int);
    }

    #[test]
    fn test_preferred_coding_float() {
        assert_eq!(coding_of(&[0.5, 1.0]), Encoding::Float);
        assert_eq!(coding_of(&[3e9]), Encoding::Float);
        assert_eq!(coding_of(&[-3e9]), Encoding::Float);
    }
}
