//! Flat `key=value` run parameters with typed lookup.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by parameter parsing and lookup.
#[derive(Debug, Error)]
pub enum ParamError {
    /// An argument word was not of the form `key=value`.
    #[error("malformed parameter '{0}', expected key=value")]
    Malformed(String),

    /// A required key was absent.
    #[error("missing required parameter '{0}'")]
    Missing(String),

    /// A value failed to parse as the requested type.
    #[error("parameter '{key}': cannot interpret '{value}' as {wanted}")]
    BadValue {
        key: String,
        value: String,
        wanted: &'static str,
    },
}

/// Name→value parameter map with typed fetch and optional defaults.
#[derive(Debug, Clone, Default)]
pub struct ParamMap {
    values: HashMap<String, String>,
}

impl ParamMap {
    /// Parse `key=value` words into a map. Later duplicates win.
    pub fn from_args<I>(args: I) -> Result<Self, ParamError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut values = HashMap::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| ParamError::Malformed(arg.to_string()))?;
            if key.is_empty() {
                return Err(ParamError::Malformed(arg.to_string()));
            }
            values.insert(key.to_string(), value.to_string());
        }
        Ok(Self { values })
    }

    /// Whether `key` was supplied.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Fetch a required value, parsed as `T`.
    pub fn get<T>(&self, key: &str) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self
            .values
            .get(key)
            .ok_or_else(|| ParamError::Missing(key.to_string()))?;
        raw.parse().map_err(|_| ParamError::BadValue {
            key: key.to_string(),
            value: raw.clone(),
            wanted: std::any::type_name::<T>(),
        })
    }

    /// Fetch an optional value, falling back to `default` when absent.
    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.contains(key) {
            self.get(key)
        } else {
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_values() {
        let params =
            ParamMap::from_args(["assigner=new", "fract=0.8", "nptg=5", "output="]).unwrap();
        assert_eq!(params.get::<String>("assigner").unwrap(), "new");
        assert!((params.get::<f64>("fract").unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(params.get::<i32>("nptg").unwrap(), 5);
        assert_eq!(params.get::<String>("output").unwrap(), "");
    }

    #[test]
    fn defaults_apply_only_when_absent() {
        let params = ParamMap::from_args(["posang=3.5"]).unwrap();
        assert!((params.get_or::<f64>("posang", 0.0).unwrap() - 3.5).abs() < 1e-12);
        assert!((params.get_or::<f64>("dposang", 4.0).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn missing_required_key() {
        let params = ParamMap::from_args(["fract=0.5"]).unwrap();
        assert!(matches!(
            params.get::<String>("input"),
            Err(ParamError::Missing(_))
        ));
    }

    #[test]
    fn rejects_words_without_equals() {
        assert!(matches!(
            ParamMap::from_args(["fract"]),
            Err(ParamError::Malformed(_))
        ));
        assert!(ParamMap::from_args(["=x"]).is_err());
    }

    #[test]
    fn unparsable_value_names_key() {
        let params = ParamMap::from_args(["nptg=five"]).unwrap();
        match params.get::<i32>("nptg") {
            Err(ParamError::BadValue { key, value, .. }) => {
                assert_eq!(key, "nptg");
                assert_eq!(value, "five");
            }
            other => panic!("expected BadValue, got {other:?}"),
        }
    }

    #[test]
    fn later_duplicates_win() {
        let params = ParamMap::from_args(["nptg=3", "nptg=7"]).unwrap();
        assert_eq!(params.get::<i32>("nptg").unwrap(), 7);
    }
}
