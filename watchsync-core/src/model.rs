use serde::{Deserialize, Serialize};

/// One remote watch entry, keyed externally by an opaque identifier.
///
/// The watch API attaches plenty of bookkeeping fields to each entry; only
/// the URL and tag matter here, everything else is ignored on deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct Watch {
    pub url: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Body of a watch creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewWatch<'a> {
    pub url: &'a str,
    pub tag: &'a str,
}
