use tracing::warn;

/// Field separator in the serialized ledger. Take identifiers are
/// `uuid-index` and never contain it; sentences are expected not to either.
pub const FIELD_SEPARATOR: char = '|';

/// Storage key the serialized ledger persists under between runs. Doubles
/// as the conventional file name of the transcript index in the exported
/// corpus.
pub const LEDGER_STORE_KEY: &str = "metadata.csv";

/// One exported take: its identifier and the sentence that was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub take_id: String,
    pub sentence: String,
}

/// Ordered record of exported takes, mapping file identifiers to sentences.
///
/// Append-only during normal operation: re-recording a script index adds
/// another line rather than replacing the old one. Clearable as a single
/// atomic reset. One line per completed export, in export order.
#[derive(Debug, Default)]
pub struct MetadataLedger {
    entries: Vec<LedgerEntry>,
}

impl MetadataLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from its serialized form. An empty blob yields an
    /// empty ledger; lines without a separator are dropped with a warning.
    pub fn restore(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| match line.split_once(FIELD_SEPARATOR) {
                Some((take_id, sentence)) => Some(LedgerEntry {
                    take_id: take_id.to_string(),
                    sentence: sentence.to_string(),
                }),
                None => {
                    warn!("Dropping malformed ledger line: {}", line);
                    None
                }
            })
            .collect();

        Self { entries }
    }

    pub fn append(&mut self, take_id: impl Into<String>, sentence: impl Into<String>) {
        self.entries.push(LedgerEntry {
            take_id: take_id.into(),
            sentence: sentence.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// All records, earliest first, one `id|sentence` line each. No header
    /// row and no trailing newline.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}{}{}", e.take_id, FIELD_SEPARATOR, e.sentence))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
