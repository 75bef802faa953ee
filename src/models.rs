/// A Gmail label as returned by `labels.list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub id: String,
    pub name: String,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// File stem used for the label's export.
    ///
    /// System labels (where id and name are equal) use the name alone, user labels
    /// use `id-name`. Nested label separators become underscores.
    pub fn file_stem(&self) -> String {
        let stem = if self.id == self.name {
            self.name.clone()
        } else {
            format!("{}-{}", self.id, self.name)
        };
        stem.replace('/', "_")
    }
}

/// Label metadata from `labels.get`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelInfo {
    pub id: String,
    pub messages_total: u64,
}

/// Position in a paginated `messages.list` walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// No request has been made yet
    First,
    /// Continuation token from the previous page
    Token(String),
    /// The previous page carried no continuation token
    Exhausted,
}

impl PageCursor {
    /// Cursor that follows a page whose `nextPageToken` was `next`
    pub fn after(next: Option<String>) -> Self {
        match next {
            Some(token) if !token.is_empty() => PageCursor::Token(token),
            _ => PageCursor::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PageCursor::Exhausted)
    }

    /// Token to send with the request, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            PageCursor::Token(token) => Some(token),
            _ => None,
        }
    }
}

/// Message reference from `messages.list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
}

/// One page of `messages.list`
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    pub messages: Vec<MessageSummary>,
    pub next_page_token: Option<String>,
}

/// Header name/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Message detail from `messages.get`, reduced to its headers
#[derive(Debug, Clone, Default)]
pub struct MessageDetail {
    pub id: String,
    pub headers: Vec<Header>,
}

/// One line of the export CSV
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedRow {
    pub id: String,
    pub date: String,
    pub from: String,
    pub subject: String,
}

impl ExportedRow {
    /// Build a row from message headers.
    ///
    /// `From` is matched as `From` or `from`; `Date` and `Subject` must match exactly.
    /// Commas are replaced with spaces since the export is written unquoted.
    pub fn from_detail(message_id: &str, detail: &MessageDetail) -> Self {
        let mut row = ExportedRow {
            id: message_id.to_string(),
            ..Default::default()
        };

        for header in &detail.headers {
            match header.name.as_str() {
                "Subject" => row.subject = strip_commas(&header.value),
                "From" | "from" => row.from = strip_commas(&header.value),
                "Date" => row.date = strip_commas(&header.value),
                _ => {}
            }
        }

        row
    }
}

fn strip_commas(value: &str) -> String {
    value.replace(',', " ")
}
