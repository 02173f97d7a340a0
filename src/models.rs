//! Domain models that mirror the `livre` and `exemplaire` tables. They stay
//! plain data holders; the persistence layer in `db` owns every query and the
//! `report` module owns console formatting.

use std::fmt;

use chrono::NaiveDate;

/// Genre classification of a book. Labels are the values stored in the
/// `categorie` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Category {
    Novel,
    ScienceFiction,
    Fantasy,
    Crime,
    Biography,
    History,
    Science,
    Children,
    Comics,
    Poetry,
    Essay,
    /// Fallback for [`Category::or_default`].
    #[default]
    Other,
    /// A stored label outside the known set, kept verbatim so data-quality
    /// issues stay visible to callers.
    Unknown(String),
}

impl Category {
    /// Every known category, in display order.
    pub const KNOWN: [Category; 12] = [
        Category::Novel,
        Category::ScienceFiction,
        Category::Fantasy,
        Category::Crime,
        Category::Biography,
        Category::History,
        Category::Science,
        Category::Children,
        Category::Comics,
        Category::Poetry,
        Category::Essay,
        Category::Other,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::Novel => "Roman",
            Category::ScienceFiction => "Science-Fiction",
            Category::Fantasy => "Fantastique",
            Category::Crime => "Policier",
            Category::Biography => "Biographie",
            Category::History => "Histoire",
            Category::Science => "Sciences",
            Category::Children => "Jeunesse",
            Category::Comics => "Bande dessinée",
            Category::Poetry => "Poésie",
            Category::Essay => "Essai",
            Category::Other => "Autre",
            Category::Unknown(raw) => raw,
        }
    }

    /// Case-insensitive lookup against the known labels. Never fails: an
    /// unrecognized label becomes [`Category::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let wanted = raw.trim().to_lowercase();
        Self::KNOWN
            .into_iter()
            .find(|category| category.label().to_lowercase() == wanted)
            .unwrap_or_else(|| Category::Unknown(raw.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Unknown(_))
    }

    /// Re-run [`Category::parse`] on an `Unknown` label, so a hand-built
    /// `Unknown("roman")` becomes [`Category::Novel`]. This is the form that
    /// gets stored.
    pub fn normalized(&self) -> Self {
        match self {
            Category::Unknown(raw) => Category::parse(raw),
            known => known.clone(),
        }
    }

    /// Collapse an unknown label onto the default category.
    pub fn or_default(self) -> Self {
        if self.is_known() {
            self
        } else {
            Category::default()
        }
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::parse(raw)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical wear of a copy, stored in the `etat` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Mint.
    New,
    /// Light signs of wear. Also the fallback for [`Condition::or_default`].
    #[default]
    Good,
    /// Worn but usable.
    Average,
    /// Due for replacement.
    Poor,
    Unknown(String),
}

impl Condition {
    pub const KNOWN: [Condition; 4] = [
        Condition::New,
        Condition::Good,
        Condition::Average,
        Condition::Poor,
    ];

    pub fn label(&self) -> &str {
        match self {
            Condition::New => "neuf",
            Condition::Good => "bon",
            Condition::Average => "moyen",
            Condition::Poor => "mauvais",
            Condition::Unknown(raw) => raw,
        }
    }

    /// Same lenient policy as [`Category::parse`].
    pub fn parse(raw: &str) -> Self {
        let wanted = raw.trim().to_lowercase();
        Self::KNOWN
            .into_iter()
            .find(|condition| condition.label() == wanted)
            .unwrap_or_else(|| Condition::Unknown(raw.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Condition::Unknown(_))
    }

    pub fn normalized(&self) -> Self {
        match self {
            Condition::Unknown(raw) => Condition::parse(raw),
            known => known.clone(),
        }
    }

    pub fn or_default(self) -> Self {
        if self.is_known() {
            self
        } else {
            Condition::default()
        }
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::parse(raw)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog entry, independent of its physical copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// ISBN-like primary key. Immutable once the row exists.
    pub isbn: i64,
    pub title: String,
    pub author: String,
    pub category: Category,
    pub page_count: u32,
    /// Declared number of copies. Informational only: nothing reconciles it
    /// with the `exemplaire` rows, and no update path rewrites it.
    pub copy_count: u32,
    pub created_on: NaiveDate,
}

impl Book {
    /// `Title - Author`, dropping the hyphen when the author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

/// The fields a book update overwrites. ISBN and declared copy count are
/// deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookChanges {
    pub title: String,
    pub author: String,
    pub category: Category,
    pub page_count: u32,
    pub created_on: NaiveDate,
}

impl From<&Book> for BookChanges {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            page_count: book.page_count,
            created_on: book.created_on,
        }
    }
}

/// One physical copy of a book, carrying the owning book as resolved by the
/// join that loaded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCopy {
    /// Generated by the database on insert; `None` until then.
    pub id: Option<i64>,
    pub condition: Condition,
    pub available: bool,
    pub created_on: NaiveDate,
    pub book: Book,
}

impl BookCopy {
    /// A copy that has not been persisted yet.
    pub fn new(condition: Condition, available: bool, created_on: NaiveDate, book: Book) -> Self {
        Self {
            id: None,
            condition,
            available,
            created_on,
            book,
        }
    }

    /// `Oui` / `Non`, as shown in the copy listing.
    pub fn availability_label(&self) -> &'static str {
        availability_label(self.available)
    }
}

impl fmt::Display for BookCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.available {
            "Disponible"
        } else {
            "Indisponible"
        };
        match self.id {
            Some(id) => write!(f, "Exemplaire #{id} - {} ({state})", self.condition),
            None => write!(f, "Exemplaire (non enregistré) - {} ({state})", self.condition),
        }
    }
}

/// The fields a copy update overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyChanges {
    pub condition: Condition,
    pub available: bool,
}

/// Light projection used by the copy listing: no full book join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySummary {
    pub id: i64,
    pub condition: Condition,
    pub available: bool,
    pub title: String,
}

impl CopySummary {
    pub fn availability_label(&self) -> &'static str {
        availability_label(self.available)
    }
}

fn availability_label(available: bool) -> &'static str {
    if available {
        "Oui"
    } else {
        "Non"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            isbn: 111,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            category: Category::ScienceFiction,
            page_count: 412,
            copy_count: 2,
            created_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn category_parse_ignores_case_and_whitespace() {
        assert_eq!(Category::parse("science-fiction"), Category::ScienceFiction);
        assert_eq!(Category::parse("  ROMAN "), Category::Novel);
        assert_eq!(Category::parse("BANDE DESSINÉE"), Category::Comics);
    }

    #[test]
    fn unknown_category_keeps_raw_label() {
        let parsed = Category::parse("Cuisine");
        assert_eq!(parsed, Category::Unknown("Cuisine".to_string()));
        assert_eq!(parsed.label(), "Cuisine");
        assert!(!parsed.is_known());
        assert_eq!(parsed.or_default(), Category::Other);
    }

    #[test]
    fn known_category_labels_parse_back() {
        for category in Category::KNOWN {
            assert_eq!(Category::parse(category.label()), category);
        }
    }

    #[test]
    fn condition_parse_and_fallback() {
        assert_eq!(Condition::parse("NEUF"), Condition::New);
        assert_eq!(Condition::parse("mauvais"), Condition::Poor);
        let odd = Condition::parse("abîmé");
        assert_eq!(odd, Condition::Unknown("abîmé".to_string()));
        assert_eq!(odd.or_default(), Condition::Good);
    }

    #[test]
    fn normalized_resolves_hand_built_unknowns() {
        assert_eq!(
            Category::Unknown("roman".to_string()).normalized(),
            Category::Novel
        );
        assert_eq!(
            Category::Unknown("Cuisine".to_string()).normalized(),
            Category::Unknown("Cuisine".to_string())
        );
        assert_eq!(Category::Essay.normalized(), Category::Essay);
        assert_eq!(
            Condition::Unknown(" Neuf ".to_string()).normalized(),
            Condition::New
        );
    }

    #[test]
    fn display_title_omits_blank_author() {
        let mut book = dune();
        assert_eq!(book.display_title(), "Dune - Herbert");
        book.author = "  ".to_string();
        assert_eq!(book.display_title(), "Dune");
    }

    #[test]
    fn copy_display_and_availability() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut copy = BookCopy::new(Condition::New, true, created, dune());
        assert_eq!(
            copy.to_string(),
            "Exemplaire (non enregistré) - neuf (Disponible)"
        );
        assert_eq!(copy.availability_label(), "Oui");

        copy.id = Some(7);
        copy.available = false;
        assert_eq!(copy.to_string(), "Exemplaire #7 - neuf (Indisponible)");
        assert_eq!(copy.availability_label(), "Non");
    }

    #[test]
    fn book_changes_copy_editable_fields() {
        let book = dune();
        let changes = BookChanges::from(&book);
        assert_eq!(changes.title, "Dune");
        assert_eq!(changes.page_count, 412);
        assert_eq!(changes.created_on, book.created_on);
    }
}
