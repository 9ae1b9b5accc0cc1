//! Info dictionary of the merged document.
//!
//! Title, Author, Subject and Keywords come from [`Metadata`]; Creator,
//! Producer and the creation/modification dates are always written.

use crate::config::Metadata;
use crate::error::{PageCatError, Result};
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::time::{SystemTime, UNIX_EPOCH};

/// Manager for PDF metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write `metadata` into the document's Info dictionary.
    ///
    /// The dictionary is created if the document has none. Unset fields are
    /// left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pagecat::merge::metadata::MetadataManager;
    /// # use pagecat::config::Metadata;
    /// # use lopdf::Document;
    /// let mut doc = Document::with_version("1.7");
    /// let metadata = Metadata::new(Some("Report".to_string()), None, None, None);
    /// MetadataManager::new().set_metadata(&mut doc, &metadata).unwrap();
    /// assert_eq!(MetadataManager::new().get_metadata(&doc).title.as_deref(), Some("Report"));
    /// ```
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        if !matches!(doc.get_object(info_id), Ok(Object::Dictionary(_))) {
            doc.objects.insert(info_id, Object::Dictionary(Dictionary::new()));
        }
        let info_dict = doc.get_dictionary_mut(info_id).map_err(|e| {
            PageCatError::build_failed(format!("cannot write Info dictionary: {e}"))
        })?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info_dict.set(key, text(value));
            }
        }

        let producer = format!("{} {}", crate::NAME, crate::VERSION);
        info_dict.set("Creator", text(crate::NAME));
        info_dict.set("Producer", text(&producer));

        let date = format_pdf_date(SystemTime::now());
        info_dict.set("CreationDate", text(&date));
        info_dict.set("ModDate", text(&date));

        Ok(())
    }

    /// Read Title, Author, Subject and Keywords back from a document.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info_dict) = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok()
        else {
            return Metadata::default();
        };

        Metadata::new(
            string_field(info_dict, b"Title"),
            string_field(info_dict, b"Author"),
            string_field(info_dict, b"Subject"),
            string_field(info_dict, b"Keywords"),
        )
    }
}

fn text(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Format a SystemTime as a PDF date string in UTC: `D:YYYYMMDDHHmmSSZ`.
fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let days = (secs / 86_400) as i64;
    let (year, month, day) = civil_from_days(days);
    let time_of_day = secs % 86_400;

    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}Z",
        year,
        month,
        day,
        time_of_day / 3_600,
        (time_of_day % 3_600) / 60,
        time_of_day % 60
    )
}

/// Gregorian date for a number of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
