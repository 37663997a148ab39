use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AccountsRequest {
    pub user: Option<String>,
}

/// Either a single account id or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AccountField {
    One(String),
    Many(Vec<String>),
}

impl AccountField {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::One(account) => vec![account],
            Self::Many(accounts) => accounts,
        }
    }
}

/// Raw viewer selection as sent by the display layer. Every field is
/// optional; blanks count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionRequest {
    pub account: Option<AccountField>,
    pub view: Option<String>,
    pub measure: Option<String>,
    pub partition_class: Option<String>,
    pub granularity: Option<String>,
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
