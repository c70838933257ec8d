//! Stable identities for item values.
//!
//! Items such as accordion items are identified by a value of the root's
//! key type. When the integrator omits the value, only `String` keys can
//! generate one; every other key type must be supplied explicitly.

use std::fmt::Debug;

use uuid::Uuid;

use crate::error::ConfigError;

/// A value type usable as an item identity.
pub trait ItemKey: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Generate a fresh identity, if this type knows how.
    fn generate() -> Option<Self> {
        None
    }
}

impl ItemKey for String {
    fn generate() -> Option<Self> {
        Some(format!("item-{}", Uuid::new_v4().simple()))
    }
}

macro_rules! explicit_item_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl ItemKey for $ty {})*
    };
}

explicit_item_keys!(&'static str, char, bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Use `value`, or generate one, or fail with
/// [`ConfigError::MissingIdentity`].
pub fn resolve<T: ItemKey>(value: Option<T>) -> Result<T, ConfigError> {
    match value {
        Some(value) => Ok(value),
        None => T::generate().ok_or(ConfigError::MissingIdentity {
            type_name: std::any::type_name::<T>(),
        }),
    }
}
