use serde::Deserialize;

use crate::error::{DbError, Result};

/// How many databases a unit of work may span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectType {
    /// One database per unit of work
    #[default]
    SingleDatabase,
    /// Coordinated units of work across databases
    MultipleDatabases,
}

impl ConnectType {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ConnectType::SingleDatabase => 1,
            ConnectType::MultipleDatabases => 2,
        }
    }
}

/// Options passed to the native driver when opening a connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectOptions {
    pub dsn: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub pwd: Option<String>,
    #[serde(default)]
    pub autocommit: bool,
    #[serde(default)]
    pub connect_type: ConnectType,
    /// Default query timeout for new cursors, in seconds
    #[serde(default)]
    pub timeout: u32,
}

impl ConnectOptions {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            uid: None,
            pwd: None,
            autocommit: false,
            connect_type: ConnectType::default(),
            timeout: 0,
        }
    }

    #[must_use]
    pub fn builder(dsn: impl Into<String>) -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::new(dsn)
    }

    /// Read options from a JSON document such as
    /// `{"dsn": "sample", "uid": "db2inst1", "autocommit": true}`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Interface` when the document is malformed or `dsn` is
    /// empty.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let opts: ConnectOptions = serde_json::from_str(json)
            .map_err(|e| DbError::Interface(format!("invalid connect options: {e}")))?;
        if opts.dsn.trim().is_empty() {
            return Err(DbError::Interface("connect options require a dsn".to_string()));
        }
        Ok(opts)
    }
}

/// Fluent builder for [`ConnectOptions`].
#[derive(Debug, Clone)]
pub struct ConnectOptionsBuilder {
    opts: ConnectOptions,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            opts: ConnectOptions::new(dsn),
        }
    }

    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.opts.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn pwd(mut self, pwd: impl Into<String>) -> Self {
        self.opts.pwd = Some(pwd.into());
        self
    }

    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.opts.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn connect_type(mut self, connect_type: ConnectType) -> Self {
        self.opts.connect_type = connect_type;
        self
    }

    #[must_use]
    pub fn timeout(mut self, seconds: u32) -> Self {
        self.opts.timeout = seconds;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let opts = ConnectOptions::from_json_str(r#"{"dsn": "sample"}"#).unwrap();
        assert_eq!(opts, ConnectOptions::new("sample"));
        assert_eq!(opts.connect_type.code(), 1);
    }

    #[test]
    fn json_full() {
        let opts = ConnectOptions::from_json_str(
            r#"{"dsn": "sample", "uid": "db2inst1", "pwd": "secret",
                "autocommit": true, "connect_type": "multiple_databases", "timeout": 30}"#,
        )
        .unwrap();
        let built = ConnectOptions::builder("sample")
            .uid("db2inst1")
            .pwd("secret")
            .autocommit(true)
            .connect_type(ConnectType::MultipleDatabases)
            .timeout(30)
            .finish();
        assert_eq!(opts, built);
    }

    #[test]
    fn json_errors() {
        assert!(ConnectOptions::from_json_str("{}").is_err());
        assert!(ConnectOptions::from_json_str(r#"{"dsn": "  "}"#).is_err());
    }
}
