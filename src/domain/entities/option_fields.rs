use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidateLength;

/// Tri-state field for PATCH bodies.
///
/// - `Unchanged` → key absent from the body
/// - `SetToNull` → key present with `null`
/// - `SetToValue` → key present with a value
///
/// Structs holding these fields need `#[serde(default)]` so that missing keys
/// land on `Unchanged`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => OptionField::SetToValue(v),
            None => OptionField::SetToNull,
        })
    }
}

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>,
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }

    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

impl<T> OptionField<T> {
    /// - `None` → unchanged
    /// - `Some(None)` → set null
    /// - `Some(Some(T))` → set to value
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Self::Unchanged => None,
            Self::SetToNull => Some(None),
            Self::SetToValue(v) => Some(Some(v)),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Resolves against the stored value: unchanged keeps `current`.
    pub fn apply(&self, current: Option<T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Self::Unchanged => current,
            Self::SetToNull => None,
            Self::SetToValue(v) => Some(v.clone()),
        }
    }
}

impl OptionField<String> {
    pub fn flatten_str(&self) -> Option<&str> {
        self.value_ref().map(|s| s.as_str())
    }
}

impl<T> From<Option<Option<T>>> for OptionField<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => OptionField::Unchanged,
            Some(None) => OptionField::SetToNull,
            Some(Some(v)) => OptionField::SetToValue(v),
        }
    }
}
