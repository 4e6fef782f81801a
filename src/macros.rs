/// Declares a transparent newtype around `$type` with the usual derives, serde
/// passthrough and `new` / `value` / `into_value` helpers.
#[macro_export]
macro_rules! new_type {
    ($(#[$outer:meta])* $name:ident: $(#[$inner:meta])* $type:ty) => {
        #[derive(
            Debug,
            Hash,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::derive_more::AsRef,
            ::derive_more::From,
            ::derive_more::Display,
        )]
        #[serde(transparent)]
        $(#[$outer])*
        pub struct $name($(#[$inner])* pub $type);

        impl $name {
            pub fn new(value: impl Into<$type>) -> Self {
                Self(value.into())
            }

            pub fn value(&self) -> &$type {
                &self.0
            }

            pub fn into_value(self) -> $type {
                self.0
            }
        }
    };
}
