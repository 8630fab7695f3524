use crate::refs::{ObjectReferences, RefType};
use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike};
use pdf_writer::{Date, Name, Pdf, TextStr};

/// Metadata written to the document information dictionary.
///
/// Every entry left as [None] is left out of the PDF, apart from the dates.
/// [Info::new] names this crate as the creator; [Info::default] leaves it unset.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Free form; readers usually expect a comma separated list
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Defaults to the moment the document is written
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// Defaults to the creation date
    pub modified_date: Option<DateTime<FixedOffset>>,
}

const DEFAULT_CREATOR: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " v",
    env!("CARGO_PKG_VERSION")
);

impl Info {
    pub fn new() -> Info {
        Info {
            creator: Some(DEFAULT_CREATOR.to_string()),
            ..Info::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn creation_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn modified_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.modified_date = Some(date);
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut dict = writer.document_info(id);

        let entries = [
            (Name(b"Title"), self.title.as_deref()),
            (Name(b"Author"), self.author.as_deref()),
            (Name(b"Subject"), self.subject.as_deref()),
            (Name(b"Keywords"), self.keywords.as_deref()),
            (Name(b"Creator"), self.creator.as_deref()),
            (Name(b"Producer"), self.producer.as_deref()),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                dict.pair(key, TextStr(value));
            }
        }

        let created = self.creation_date.unwrap_or_else(|| Local::now().into());
        dict.creation_date(pdf_date(&created));
        dict.modified_date(pdf_date(&self.modified_date.unwrap_or(created)));
    }
}

/// Convert to a PDF date, keeping the original UTC offset
fn pdf_date(date: &DateTime<FixedOffset>) -> Date {
    let offset_minutes = date.offset().local_minus_utc() / 60;
    Date::new(date.year() as u16)
        .month(date.month() as u8)
        .day(date.day() as u8)
        .hour(date.hour() as u8)
        .minute(date.minute() as u8)
        .second(date.second() as u8)
        .utc_offset_hour((offset_minutes / 60) as i8)
        .utc_offset_minute((offset_minutes % 60).unsigned_abs() as u8)
}
