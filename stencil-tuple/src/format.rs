//! Canonical text renderings consumed by code generation.
//!
//! Output is in insertion order and is built by plain concatenation of the
//! given separators, affixes and values; generated sources depend on it
//! byte for byte.

use std::fmt;

use stencil_traits::DimValue;

use crate::tuple::Tuple;

impl<T: DimValue> Tuple<T> {
    fn join_each(&self, separator: &str, mut item: impl FnMut(&mut String, usize)) -> String {
        let mut out = String::new();
        for i in 0..self.len() {
            if i > 0 {
                out.push_str(separator);
            }
            item(&mut out, i);
        }
        out
    }

    /// Values only, e.g. `"4, 3, 2"` or, with separator `"x"`, `"4x3x2"`.
    pub fn make_val_str(&self, separator: &str, prefix: &str, suffix: &str) -> String {
        self.join_each(separator, |out, i| {
            out.push_str(prefix);
            out.push_str(&self.dims[i].val().to_string());
            out.push_str(suffix);
        })
    }

    /// Names only, e.g. `"x, y, z"` or, with prefix `"int "`, `"int x, int y"`.
    pub fn make_dim_str(&self, separator: &str, prefix: &str, suffix: &str) -> String {
        self.join_each(separator, |out, i| {
            out.push_str(prefix);
            out.push_str(self.dims[i].name().as_str());
            out.push_str(suffix);
        })
    }

    /// Name/value pairs, e.g. `"x=4, y=3, z=2"`.
    pub fn make_dim_val_str(
        &self,
        separator: &str,
        infix: &str,
        prefix: &str,
        suffix: &str,
    ) -> String {
        self.join_each(separator, |out, i| {
            let d = &self.dims[i];
            out.push_str(prefix);
            out.push_str(d.name().as_str());
            out.push_str(infix);
            out.push_str(&d.val().to_string());
            out.push_str(suffix);
        })
    }

    /// Signed offsets from each dim, e.g. `"x+4, y, z-2"`.
    pub fn make_dim_val_offset_str(&self, separator: &str, prefix: &str, suffix: &str) -> String {
        let zero = T::zero();
        self.join_each(separator, |out, i| {
            let d = &self.dims[i];
            out.push_str(prefix);
            out.push_str(d.name().as_str());
            let v = d.val();
            if v > zero {
                out.push('+');
                out.push_str(&v.to_string());
            } else if v < zero {
                // Display already carries the '-'.
                out.push_str(&v.to_string());
            }
            out.push_str(suffix);
        })
    }

    /// Offsets in units of vector folds, e.g. `"xv + (4 / VLEN_X), yv, tv+2"`.
    ///
    /// `self` holds the numerators. A dim present in `norm` is divided by the
    /// `VLEN_<DIM>` constant, with the sign kept outside the division so
    /// negative offsets never hit truncating division. Dims absent from `norm`
    /// get a plain signed addition.
    pub fn make_dim_val_norm_offset_str(
        &self,
        norm: &Tuple<T>,
        separator: &str,
        prefix: &str,
        suffix: &str,
    ) -> String {
        let zero = T::zero();
        self.join_each(separator, |out, i| {
            let d = &self.dims[i];
            let v = d.val();
            out.push_str(prefix);
            out.push_str(d.name().as_str());
            out.push('v');
            if v != zero {
                if norm.contains(d.name()) {
                    if v > zero {
                        out.push_str(" + (");
                        out.push_str(&v.to_string());
                    } else {
                        out.push_str(" - (");
                        out.push_str(&(zero - v).to_string());
                    }
                    out.push_str(" / VLEN_");
                    out.push_str(&d.name().as_str().to_uppercase());
                    out.push(')');
                } else {
                    if v > zero {
                        out.push('+');
                    }
                    out.push_str(&v.to_string());
                }
            }
            out.push_str(suffix);
        })
    }
}

/// `x=4, y=3, z=2`
impl<T: DimValue> fmt::Display for Tuple<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.make_dim_val_str(", ", "=", "", ""))
    }
}
