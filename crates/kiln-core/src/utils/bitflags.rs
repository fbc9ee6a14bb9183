// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to define the RHI's flag sets (buffer flags, clear flags, root
//! signature flags...) without pulling an external bitflags crate.

#[macro_export]
#[doc(hidden)]
macro_rules! kiln_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Creates a flag set from raw bits. Unknown bits are kept.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a copy of `self` with `other` inserted.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a copy of `self` with `other` removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut remaining = self.bits;
                let mut first_flag = true;

                write!(f, "{} {{ ", stringify!($name))?;

                $(
                    // Zero-valued aliases (e.g. `NONE`) never print.
                    if ($flag_value != 0) && (remaining & $flag_value) == $flag_value {
                        if !first_flag {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        remaining &= !$flag_value;
                        first_flag = false;
                    }
                )*

                if remaining != 0 {
                    if !first_flag {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", remaining)?;
                    first_flag = false;
                }

                if first_flag {
                    write!(f, "EMPTY")?;
                }

                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::kiln_bitflags;

    kiln_bitflags! {
        /// Flags used to exercise the macro.
        pub struct ClearMask: u32 {
            const NONE = 0;
            const COLOR = 1 << 0;
            const DEPTH = 1 << 1;
            const STENCIL = 1 << 2;
            const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
        }
    }

    #[test]
    fn test_empty_mask() {
        let mask = ClearMask::default();
        assert!(mask.is_empty());
        assert!(mask.contains(ClearMask::EMPTY));
        assert!(!mask.contains(ClearMask::COLOR));
        assert_eq!(format!("{:?}", mask), "ClearMask { EMPTY }");
        assert_eq!(ClearMask::NONE, ClearMask::EMPTY);
    }

    #[test]
    fn test_combined_constant_matches_union() {
        assert_eq!(ClearMask::COLOR_DEPTH, ClearMask::COLOR | ClearMask::DEPTH);
        assert!(ClearMask::COLOR_DEPTH.contains(ClearMask::DEPTH));
        assert!(!ClearMask::COLOR_DEPTH.contains(ClearMask::STENCIL));
        assert_eq!(
            format!("{:?}", ClearMask::COLOR_DEPTH),
            "ClearMask { COLOR | DEPTH }"
        );
    }

    #[test]
    fn test_insert_remove_and_builders() {
        let mut mask = ClearMask::COLOR;
        mask.insert(ClearMask::STENCIL);
        assert_eq!(mask.bits(), 0b101);
        mask.remove(ClearMask::COLOR);
        assert_eq!(mask, ClearMask::STENCIL);

        let built = ClearMask::EMPTY.with(ClearMask::DEPTH).without(ClearMask::STENCIL);
        assert_eq!(built, ClearMask::DEPTH);
    }

    #[test]
    fn test_intersects_and_operators() {
        let left = ClearMask::COLOR | ClearMask::DEPTH;
        let right = ClearMask::DEPTH | ClearMask::STENCIL;
        assert!(left.intersects(right));
        assert_eq!(left & right, ClearMask::DEPTH);
        assert!(!ClearMask::COLOR.intersects(ClearMask::STENCIL));

        let mut accumulated = ClearMask::EMPTY;
        accumulated |= ClearMask::COLOR;
        accumulated &= left;
        assert_eq!(accumulated, ClearMask::COLOR);
        assert_eq!((!ClearMask::COLOR).bits(), !1u32);
    }

    #[test]
    fn test_unknown_bits_are_reported() {
        let mask = ClearMask::from_bits_truncate(0b1001);
        assert_eq!(format!("{:?}", mask), "ClearMask { COLOR | UNKNOWN(0x8) }");
    }
}
