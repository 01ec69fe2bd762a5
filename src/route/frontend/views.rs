//! Server-side rendered HTML for the frontend.

use std::fmt::Write;

use crate::book::Book;

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Bookshelf</title>
    <link rel="stylesheet" href="/css/style.css">
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/books">Books</a>
        <a href="/authors">Authors</a>
        <a href="/years">Years</a>
        <a href="/search">Search</a>
    </nav>
    <main>
        <h1>{title}</h1>
{content}
    </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index() -> String {
    layout(
        "Bookshelf",
        r#"        <p>Browse the shared book collection.</p>
        <ul>
            <li><a href="/books">All books</a></li>
            <li><a href="/authors">Authors</a></li>
            <li><a href="/years">Publication years</a></li>
            <li><a href="/search">Search by name or author</a></li>
        </ul>"#,
    )
}

fn book_rows(books: &[Book]) -> String {
    let mut rows = String::new();

    for book in books {
        let fields = &book.fields;

        // Writing to a String is infallible.
        let _ = writeln!(
            rows,
            r#"                <tr data-id="{id}"><td>{name}</td><td>{author}</td><td>{isbn}</td><td>{pages}</td><td>{year}</td></tr>"#,
            id = book.id,
            name = escape(&fields.name),
            author = escape(&fields.author),
            isbn = escape(&fields.isbn),
            pages = fields.pages,
            year = fields.year,
        );
    }

    rows
}

fn books_table(books: &[Book]) -> String {
    format!(
        r#"        <table>
            <thead>
                <tr><th>Name</th><th>Author</th><th>ISBN</th><th>Pages</th><th>Year</th></tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>"#,
        rows = book_rows(books),
    )
}

pub fn book_table(title: &str, books: &[Book]) -> String {
    layout(title, &books_table(books))
}

pub fn single_column_table(
    title: &str,
    header: &str,
    values: impl IntoIterator<Item = String>,
) -> String {
    let mut rows = String::new();

    for value in values {
        let _ = writeln!(rows, "                <tr><td>{}</td></tr>", escape(&value));
    }

    let content = format!(
        r#"        <table>
            <thead>
                <tr><th>{header}</th></tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>"#,
        header = escape(header),
    );

    layout(title, &content)
}

/// Search form, followed by the results when a search was made.
pub fn search_page(term: &str, results: Option<&[Book]>) -> String {
    let mut content = format!(
        r#"        <form action="/search" method="get">
            <input type="search" name="q" value="{term}" placeholder="Name or author">
            <button type="submit">Search</button>
        </form>"#,
        term = escape(term),
    );

    match results {
        Some([]) => {
            let _ = write!(
                content,
                "\n        <p>No books match &quot;{}&quot;.</p>",
                escape(term)
            );
        }
        Some(books) => {
            content.push('\n');
            content.push_str(&books_table(books));
        }
        None => {}
    }

    layout("Search", &content)
}

#[cfg(test)]
mod tests {
    use crate::book::{BookId, NewBook};

    use super::*;

    fn book(name: &str, author: &str) -> Book {
        Book {
            id: BookId::new(),
            fields: NewBook::new(name, author, "", 100, 2000),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b class="x">Tom & 'Jerry'</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn book_table_lists_every_book() {
        let books = vec![book("Frankenstein", "Mary Shelley"), book("Dune", "Frank Herbert")];

        let html = book_table("Books", &books);

        assert!(html.contains("<td>Frankenstein</td><td>Mary Shelley</td>"));
        assert!(html.contains("<td>Dune</td><td>Frank Herbert</td>"));
        assert!(html.contains(&format!(r#"data-id="{}""#, books[0].id)));
    }

    #[test]
    fn book_table_escapes_user_data() {
        let books = vec![book("<script>alert(1)</script>", "Mallory")];

        let html = book_table("Books", &books);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn search_page_without_results_only_renders_form() {
        let html = search_page("", None);

        assert!(html.contains(r#"<form action="/search""#));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn search_page_reports_no_matches() {
        let html = search_page("nothing", Some(&[]));

        assert!(html.contains("No books match &quot;nothing&quot;."));
    }
}
