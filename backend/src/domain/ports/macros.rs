//! `define_port_error!` declares a driven-port error enum together with one
//! snake_case constructor per variant.
//!
//! ```ignore
//! define_port_error! {
//!     pub enum ClassRepositoryError {
//!         Query { message: String } => "class query failed: {message}",
//!     }
//! }
//! let err = ClassRepositoryError::query("timeout");
//! ```
//!
//! Constructor parameters are `impl Into<T>` for each field type `T`.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;
