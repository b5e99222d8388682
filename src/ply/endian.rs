//! Byte order reversal for binary PLY bodies in non-native endianness.

/// Reverses the byte order of a numeric value.
///
/// Floats are swapped via their bit representation, so the result has exactly
/// the bits that were stored in the file (in particular, NaN payloads survive).
pub trait Swap: Sized {
    fn swap(self) -> Self;

    /// Swaps only if `cond` is `true`.
    fn swap_if(self, cond: bool) -> Self {
        if cond {
            self.swap()
        } else {
            self
        }
    }
}

macro_rules! impl_swap_int {
    ($($ty:ident),*) => {
        $(
            impl Swap for $ty {
                fn swap(self) -> Self {
                    self.swap_bytes()
                }
            }
        )*
    }
}

impl_swap_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Swap for f32 {
    fn swap(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl Swap for f64 {
    fn swap(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
}


#[cfg(test)]
mod tests {
    use super::Swap;

    #[test]
    fn integers() {
        assert_eq!(0x12u8.swap(), 0x12);
        assert_eq!(0x1234u16.swap(), 0x3412);
        assert_eq!(0x1234_5678u32.swap(), 0x7856_3412);
        assert_eq!(0x0102_0304_0506_0708u64.swap(), 0x0807_0605_0403_0201);
        assert_eq!((-2i16).swap(), 0xfeffu16 as i16);
        assert_eq!(1i32.swap(), 0x0100_0000);
        assert_eq!(1i64.swap().swap(), 1);
    }

    #[test]
    fn floats() {
        let v = 3.25f32;
        assert_eq!(v.swap().to_bits(), v.to_bits().swap_bytes());
        assert_eq!(v.swap().swap(), v);

        let bytes = 1.5f64.to_be_bytes();
        assert_eq!(f64::from_ne_bytes(bytes).swap_if(cfg!(target_endian = "little")), 1.5);
    }

    #[test]
    fn swap_if_false_is_identity() {
        assert_eq!(0x1234u16.swap_if(false), 0x1234);
    }
}
