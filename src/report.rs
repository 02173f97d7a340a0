//! Plain-text listings of the catalog, written to any `io::Write`. This is
//! the only rendering the crate ships; richer front-ends consume the
//! repositories directly. Labels are French, like the stored values.

use std::io::{self, Write};

use crate::models::{Book, BookCopy, CopySummary};

const RULE: &str = "------------------------------------------";

/// Numbered `title - author` lines, one rule after each book.
pub fn write_book_list<W: Write>(out: &mut W, books: &[Book]) -> io::Result<()> {
    writeln!(out, "Liste des livres de la bibliothèque :")?;
    if books.is_empty() {
        return writeln!(out, "(aucun livre)");
    }
    for (index, book) in books.iter().enumerate() {
        writeln!(out, "{}) {}", index + 1, book.display_title())?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

pub fn write_book_details<W: Write>(out: &mut W, book: Option<&Book>) -> io::Result<()> {
    let Some(book) = book else {
        return writeln!(out, "Aucun livre trouvé avec cet ISBN.");
    };

    writeln!(out, "Informations du livre sélectionné :")?;
    writeln!(out, "ISBN : {}", book.isbn)?;
    writeln!(out, "Titre : {}", book.title)?;
    writeln!(out, "Auteur : {}", book.author)?;
    writeln!(out, "Catégorie : {}", book.category)?;
    writeln!(out, "Nombre de pages : {}", book.page_count)?;
    writeln!(out, "Nombre d'exemplaires : {}", book.copy_count)?;
    writeln!(out, "Date de création : {}", book.created_on)
}

pub fn write_copy_list<W: Write>(out: &mut W, copies: &[CopySummary]) -> io::Result<()> {
    writeln!(out, "Liste des exemplaires de la bibliothèque :")?;
    writeln!(out, "{RULE}")?;
    if copies.is_empty() {
        return writeln!(out, "(aucun exemplaire)");
    }
    for (index, copy) in copies.iter().enumerate() {
        writeln!(out, "{}) Numéro : {}", index + 1, copy.id)?;
        writeln!(out, "   État : {}", copy.condition)?;
        writeln!(out, "   Disponible : {}", copy.availability_label())?;
        writeln!(out, "   Livre : {}", copy.title)?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

pub fn write_copy_details<W: Write>(out: &mut W, copy: Option<&BookCopy>) -> io::Result<()> {
    let Some(copy) = copy else {
        return writeln!(out, "Aucun exemplaire trouvé avec ce numéro.");
    };

    writeln!(out, "Informations détaillées de l'exemplaire :")?;
    writeln!(out, "{RULE}")?;
    match copy.id {
        Some(id) => writeln!(out, "Numéro : {id}")?,
        None => writeln!(out, "Numéro : (non enregistré)")?,
    }
    writeln!(out, "État : {}", copy.condition)?;
    writeln!(out, "Disponible : {}", copy.availability_label())?;
    writeln!(out, "Date de création : {}", copy.created_on)?;
    writeln!(out, "Livre associé :")?;
    writeln!(out, "   Titre : {}", copy.book.title)?;
    writeln!(out, "   Auteur : {}", copy.book.author)?;
    writeln!(out, "   ISBN : {}", copy.book.isbn)?;
    writeln!(out, "{RULE}")
}
