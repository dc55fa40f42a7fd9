/// Inline text segments with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment {
    Text(String),
    Bold(String),
    /// Link text and its target. Only the text is ever rendered.
    Link { text: String, url: String },
}

impl TextSegment {
    /// The visible text of the segment.
    pub fn text(&self) -> &str {
        match self {
            TextSegment::Text(text) | TextSegment::Bold(text) => text,
            TextSegment::Link { text, .. } => text,
        }
    }
}

/// The three flavours of list item the classifier recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Bullet,
    Numbered,
    NestedBullet,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Bullet, ListKind::Numbered, ListKind::NestedBullet];

    /// Word paragraph style name used for this kind of item.
    pub fn style_name(self) -> &'static str {
        match self {
            ListKind::Bullet => "List Bullet",
            ListKind::Numbered => "List Number",
            ListKind::NestedBullet => "List Bullet 2",
        }
    }

    pub fn from_style_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.style_name() == name)
    }

    /// Human label printed by the format dump.
    pub fn label(self) -> &'static str {
        match self {
            ListKind::Bullet => "Bulleted",
            ListKind::Numbered => "Numbered",
            ListKind::NestedBullet => "Nested Bulleted",
        }
    }
}

/// Block-level elements recognised in the markdown subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    /// List item text with bold markers already removed.
    ListItem {
        kind: ListKind,
        text: String,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Image {
        alt: String,
        path: String,
    },
    Table {
        headers: Vec<String>,
        /// Each row holds at most `headers.len()` cells.
        rows: Vec<Vec<String>>,
    },
    LinkParagraph {
        segments: Vec<TextSegment>,
    },
    Paragraph {
        segments: Vec<TextSegment>,
    },
}
