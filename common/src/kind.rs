//! Macro for defining closed sets of kinds.

/// Defines a closed enumeration of kinds.
///
/// Every variant has a stable numeric representation (used for storage) and
/// a stable string representation (used by [`Display`], [`FromStr`] and
/// serialization).
///
/// # Example
///
/// ```rust,ignore
/// use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         #[str = "cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         #[str = "sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::Cube.to_string(), "cube");
/// assert_eq!("sphere".parse::<Kind>().unwrap(), Kind::Sphere);
/// assert_eq!(Kind::ALL.len(), 2);
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                #[str = $str:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
        )]
        #[doc = $doc]
        #[repr(u8)]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                #[strum(serialize = $str)]
                #[cfg_attr(feature = "serde", serde(rename = $str))]
                $variant = $value,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Returns the string representation of this kind.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)*
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                match u8::try_from(
                    <i16 as $crate::private::postgres_types::FromSql<'_>>
                        ::from_sql(ty, raw)?,
                )? {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into()),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                $crate::private::postgres_types::ToSql::to_sql(
                    &i16::from(self.u8()),
                    ty,
                    w,
                )
            }
        }
    };
}
