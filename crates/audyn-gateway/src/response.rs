/// Successful gateway result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No value.
    Null,
    /// Boolean outcome.
    Bool(bool),
    /// String value: a version, path, hex info-hash, or JSON snapshot.
    Text(String),
    /// Raw bytes, such as bencoded metainfo.
    Bytes(Vec<u8>),
}

impl Reply {
    /// `Text` when a value is present, `Null` otherwise.
    pub fn text_or_null(value: Option<impl Into<String>>) -> Self {
        value.map_or(Self::Null, |text| Self::Text(text.into()))
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
