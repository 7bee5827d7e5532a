/// Defines a `Copy` newtype over an integer with a fixed debug/display pattern.
///
/// `custom_type!(#[doc = "..."], Name, u32, "{:#x}")`
#[macro_export]
macro_rules! custom_type {
    ($(#[$meta:meta],)? $name:ident, $target:ty, $fmt:literal) => {
        $(#[$meta])?
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $target);

        impl $name {
            pub const fn raw(&self) -> $target {
                self.0
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, $fmt, self.0)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, $fmt, self.0)
            }
        }

        impl From<$target> for $name {
            fn from(value: $target) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $target {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}
