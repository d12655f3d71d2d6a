//! Row-major square matrices.
//!
//! Elements are stored as a flat array, row after row, which is also the
//! layout the compute records expect. [`Mat4x4`] is the workhorse for shape
//! and camera transforms; [`Mat3x3`] and [`Mat2x2`] only exist so the
//! determinant can be computed by cofactor expansion down to the 2x2 case.

use std::ops::Mul;

use glam::DMat4;

use crate::{MathError, MathResult, Tuple4};

/// 4x4 matrix, row-major.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4x4(pub [f64; 16]);

/// 3x3 matrix, row-major.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3x3(pub [f64; 9]);

/// 2x2 matrix, row-major.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat2x2(pub [f64; 4]);

/// Operations shared by every size.
macro_rules! square_matrix {
    ($name:ident, $n:literal) => {
        impl $name {
            /// Number of rows (and columns).
            pub const N: usize = $n;

            pub const ZERO: Self = Self([0.0; $n * $n]);

            pub const IDENTITY: Self = {
                let mut m = [0.0; $n * $n];
                let mut i = 0;
                while i < $n {
                    m[i * $n + i] = 1.0;
                    i += 1;
                }
                Self(m)
            };

            /// Build a matrix from its rows.
            pub fn from_rows(rows: [[f64; $n]; $n]) -> Self {
                let mut m = [0.0; $n * $n];
                for (r, row) in rows.iter().enumerate() {
                    m[r * $n..(r + 1) * $n].copy_from_slice(row);
                }
                Self(m)
            }

            #[inline]
            pub fn get(&self, row: usize, col: usize) -> f64 {
                self.0[row * $n + col]
            }

            #[inline]
            pub fn set(&mut self, row: usize, col: usize, value: f64) {
                self.0[row * $n + col] = value;
            }

            /// Row-major element slice.
            #[inline]
            pub fn as_array(&self) -> &[f64; $n * $n] {
                &self.0
            }

            pub fn transpose(&self) -> Self {
                let mut out = Self::ZERO;
                for row in 0..$n {
                    for col in 0..$n {
                        out.0[col * $n + row] = self.0[row * $n + col];
                    }
                }
                out
            }

            /// Elementwise comparison within `eps`.
            pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
                self.0
                    .iter()
                    .zip(other.0.iter())
                    .all(|(a, b)| (a - b).abs() < eps)
            }

            pub fn is_invertible(&self) -> bool {
                self.determinant() != 0.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::IDENTITY
            }
        }

        impl Mul for $name {
            type Output = Self;

            /// Row-by-column contraction.
            fn mul(self, rhs: Self) -> Self {
                let mut out = Self::ZERO;
                for row in 0..$n {
                    for col in 0..$n {
                        let mut sum = 0.0;
                        for k in 0..$n {
                            sum += self.0[row * $n + k] * rhs.0[k * $n + col];
                        }
                        out.0[row * $n + col] = sum;
                    }
                }
                out
            }
        }
    };
}

/// Cofactor expansion for matrices larger than 2x2; `$sub` is the next size down.
macro_rules! cofactor_expansion {
    ($name:ident, $n:literal, $sub:ident) => {
        impl $name {
            /// The matrix with `row` and `col` removed.
            pub fn submatrix(&self, row: usize, col: usize) -> $sub {
                let mut out = $sub::ZERO;
                let mut i = 0;
                for r in (0..$n).filter(|&r| r != row) {
                    for c in (0..$n).filter(|&c| c != col) {
                        out.0[i] = self.get(r, c);
                        i += 1;
                    }
                }
                out
            }

            pub fn minor(&self, row: usize, col: usize) -> f64 {
                self.submatrix(row, col).determinant()
            }

            pub fn cofactor(&self, row: usize, col: usize) -> f64 {
                let minor = self.minor(row, col);
                if (row + col) % 2 == 1 {
                    -minor
                } else {
                    minor
                }
            }

            /// Determinant by expansion along the first row.
            pub fn determinant(&self) -> f64 {
                (0..$n).map(|col| self.get(0, col) * self.cofactor(0, col)).sum()
            }

            /// Adjugate divided by the determinant.
            ///
            /// Fails with [`MathError::SingularMatrix`] instead of producing
            /// non-finite elements.
            pub fn inverse(&self) -> MathResult<Self> {
                let determinant = self.determinant();
                if determinant == 0.0 || !determinant.is_finite() {
                    return Err(MathError::SingularMatrix { determinant });
                }

                let mut out = Self::ZERO;
                for row in 0..$n {
                    for col in 0..$n {
                        // Writing to (col, row) transposes the cofactor matrix.
                        out.0[col * $n + row] = self.cofactor(row, col) / determinant;
                    }
                }

                if out.0.iter().all(|v| v.is_finite()) {
                    Ok(out)
                } else {
                    Err(MathError::SingularMatrix { determinant })
                }
            }
        }
    };
}

square_matrix!(Mat4x4, 4);
square_matrix!(Mat3x3, 3);
square_matrix!(Mat2x2, 2);

cofactor_expansion!(Mat4x4, 4, Mat3x3);
cofactor_expansion!(Mat3x3, 3, Mat2x2);

impl Mat2x2 {
    /// Base case of the cofactor expansion: `ad - bc`.
    pub fn determinant(&self) -> f64 {
        self.0[0] * self.0[3] - self.0[1] * self.0[2]
    }

    pub fn inverse(&self) -> MathResult<Self> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(MathError::SingularMatrix { determinant });
        }
        let [a, b, c, d] = self.0;
        Ok(Self([d / determinant, -b / determinant, -c / determinant, a / determinant]))
    }
}

impl Mat4x4 {
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Mul<Tuple4> for Mat4x4 {
    type Output = Tuple4;

    fn mul(self, t: Tuple4) -> Tuple4 {
        let m = &self.0;
        Tuple4::new(
            m[0] * t.x + m[1] * t.y + m[2] * t.z + m[3] * t.w,
            m[4] * t.x + m[5] * t.y + m[6] * t.z + m[7] * t.w,
            m[8] * t.x + m[9] * t.y + m[10] * t.z + m[11] * t.w,
            m[12] * t.x + m[13] * t.y + m[14] * t.z + m[15] * t.w,
        )
    }
}

impl From<DMat4> for Mat4x4 {
    /// glam stores columns; the transpose's column array is our row array.
    fn from(m: DMat4) -> Self {
        Self(m.transpose().to_cols_array())
    }
}

impl From<Mat4x4> for DMat4 {
    fn from(m: Mat4x4) -> Self {
        DMat4::from_cols_array(&m.0).transpose()
    }
}
