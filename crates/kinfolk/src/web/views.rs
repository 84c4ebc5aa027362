//! HTML pages.
//!
//! Pages are small enough to build directly as strings; every value that
//! comes from a request or the database goes through [`escape`].

use std::fmt::Write as _;

use crate::person::{Gender, Person};
use crate::storage::Page;

/// Results of a name search, as shown on the landing page.
#[derive(Debug, Clone, Copy)]
pub struct SearchResults<'a> {
    /// The query as typed.
    pub query: &'a str,
    /// The page that was fetched.
    pub page: Page,
    /// People on this page.
    pub people: &'a [Person],
}

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Kinfolk</title>
<style>
body {{ font-family: sans-serif; max-width: 960px; margin: 2em auto; padding: 0 1em; }}
nav a {{ margin-right: 1em; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border-bottom: 1px solid #ddd; padding: .4em; text-align: left; }}
label {{ display: block; margin-top: .8em; }}
img.thumb {{ max-height: 48px; }}
img.photo {{ max-height: 160px; }}
</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/add">Add person</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn search_form(query: &str) -> String {
    format!(
        r#"<form method="get" action="/search">
<input type="search" name="q" value="{}" placeholder="First or last name">
<button type="submit">Search</button>
</form>
"#,
        escape(query)
    )
}

/// The landing page, optionally with search results.
#[must_use]
pub fn index(results: Option<&SearchResults<'_>>) -> String {
    let mut body = search_form(results.map_or("", |r| r.query));

    if let Some(results) = results {
        if results.people.is_empty() {
            let _ = writeln!(
                body,
                "<p>No people found for &quot;{}&quot;.</p>",
                escape(results.query)
            );
        } else {
            body.push_str(&people_table(results.people));
        }
        body.push_str(&pagination(results));
    }

    layout("People", &body)
}

fn people_table(people: &[Person]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Photo</th><th>Name</th><th>Identity No</th><th>Phone</th>\
         <th>Birth date</th><th>Gender</th><th></th></tr>\n",
    );
    for person in people {
        let photo = if person.has_photo() {
            format!(
                r#"<img class="thumb" src="/{}" alt="">"#,
                escape(&person.photo_path)
            )
        } else {
            String::new()
        };
        let id = person.id.unwrap_or_default();
        let _ = writeln!(
            table,
            r#"<tr><td>{photo}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/edit/{id}">Edit</a></td></tr>"#,
            escape(&person.full_name()),
            escape(&person.identity_num),
            escape(&person.phone),
            escape(&person.birth_date),
            person.gender.label(),
        );
    }
    table.push_str("</table>\n");
    table
}

fn pagination(results: &SearchResults<'_>) -> String {
    let query = urlencoding::encode(results.query);
    let mut nav = String::new();
    if let Some(prev) = results.page.previous() {
        let _ = write!(
            nav,
            r#"<a href="/search?q={query}&amp;page={prev}">Previous</a> "#
        );
    }
    if let Some(next) = results.page.next(results.people.len()) {
        let _ = write!(nav, r#"<a href="/search?q={query}&amp;page={next}">Next</a>"#);
    }
    if nav.is_empty() {
        nav
    } else {
        format!("<p class=\"pages\">{nav}</p>\n")
    }
}

fn gender_select(selected: Option<Gender>) -> String {
    let mut select = String::from("<select name=\"gender\" required>\n");
    if selected.is_none() {
        select.push_str("<option value=\"\">Select</option>\n");
    }
    for gender in [Gender::E, Gender::K] {
        let marker = if selected == Some(gender) { " selected" } else { "" };
        let _ = writeln!(
            select,
            r#"<option value="{}"{marker}>{}</option>"#,
            gender.code(),
            gender.label()
        );
    }
    select.push_str("</select>");
    select
}

fn text_input(label: &str, name: &str, value: &str, extra: &str) -> String {
    format!(
        r#"<label>{label} <input type="text" name="{name}" value="{}"{extra}></label>
"#,
        escape(value)
    )
}

fn detail_fields(person: Option<&Person>) -> String {
    let (first, last, identity, phone, birth, about) =
        person.map_or(("", "", "", "", "", ""), |p| {
            (
                p.first_name.as_str(),
                p.last_name.as_str(),
                p.identity_num.as_str(),
                p.phone.as_str(),
                p.birth_date.as_str(),
                p.about.as_str(),
            )
        });

    let mut fields = String::new();
    fields.push_str(&text_input("First name", "firstName", first, " required"));
    fields.push_str(&text_input("Last name", "lastName", last, " required"));
    fields.push_str(&text_input(
        "Identity No",
        "identityNum",
        identity,
        r#" maxlength="11""#,
    ));
    fields.push_str(&text_input("Phone", "phone", phone, ""));
    fields.push_str(&text_input("Birth date", "birthDate", birth, ""));
    let _ = writeln!(
        fields,
        "<label>Gender {}</label>",
        gender_select(person.map(|p| p.gender))
    );
    let _ = writeln!(
        fields,
        r#"<label>About <textarea name="about" rows="4">{}</textarea></label>"#,
        escape(about)
    );
    fields
}

/// The form for adding a person.
#[must_use]
pub fn add_form() -> String {
    let mut body = String::from(
        r#"<form method="post" action="/add" enctype="multipart/form-data">
"#,
    );
    body.push_str(&detail_fields(None));
    body.push_str(
        r#"<label>Mother id <input type="number" name="motherId" min="1"></label>
<label>Father id <input type="number" name="fatherId" min="1"></label>
<label>Photo <input type="file" name="photo" accept="image/*"></label>
<p><button type="submit">Save</button></p>
</form>
"#,
    );
    layout("Add person", &body)
}

/// The form for editing an existing person.
#[must_use]
pub fn edit_form(person: &Person) -> String {
    let id = person.id.unwrap_or_default();
    let mut body = format!(
        r#"<form method="post" action="/edit/{id}" enctype="multipart/form-data">
"#
    );
    body.push_str(&detail_fields(Some(person)));
    if person.has_photo() {
        let _ = writeln!(
            body,
            r#"<p><img class="photo" src="/{}" alt="Current photo"></p>"#,
            escape(&person.photo_path)
        );
    }
    body.push_str(
        r#"<label>New photo <input type="file" name="photo" accept="image/*"></label>
<p><button type="submit">Save</button></p>
</form>
"#,
    );
    layout(&format!("Edit {}", person.full_name()), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: i64, first: &str, last: &str) -> Person {
        Person {
            id: Some(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            identity_num: String::new(),
            phone: String::new(),
            birth_date: String::new(),
            mother_id: None,
            father_id: None,
            gender: Gender::K,
            about: String::new(),
            photo_path: String::new(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("Ayşe"), "Ayşe");
    }

    #[test]
    fn test_index_without_results() {
        let html = index(None);
        assert!(html.contains(r#"action="/search""#));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_index_with_results() {
        let people = vec![person(1, "Ayşe", "Yılmaz"), person(2, "Ali", "Yılmaz")];
        let results = SearchResults {
            query: "Yılmaz",
            page: Page::new(1, 10),
            people: &people,
        };
        let html = index(Some(&results));

        assert!(html.contains("Ayşe Yılmaz"));
        assert!(html.contains(r#"href="/edit/2""#));
        assert!(html.contains(r#"value="Yılmaz""#));
        assert!(!html.contains("Next"));
        assert!(!html.contains("Previous"));
    }

    #[test]
    fn test_index_empty_results_message() {
        let results = SearchResults {
            query: "<none>",
            page: Page::new(1, 10),
            people: &[],
        };
        let html = index(Some(&results));
        assert!(html.contains("No people found for &quot;&lt;none&gt;&quot;"));
    }

    #[test]
    fn test_index_pagination_links() {
        let people: Vec<Person> = (1..=2).map(|i| person(i, "P", "Q")).collect();
        let results = SearchResults {
            query: "a b&ş",
            page: Page::new(2, 2),
            people: &people,
        };
        let html = index(Some(&results));
        assert!(html.contains(r#"href="/search?q=a%20b%26%C5%9F&amp;page=1""#));
        assert!(html.contains(r#"href="/search?q=a%20b%26%C5%9F&amp;page=3""#));
    }

    #[test]
    fn test_index_escapes_names() {
        let people = vec![person(1, "<script>", "x")];
        let results = SearchResults {
            query: "x",
            page: Page::new(1, 10),
            people: &people,
        };
        let html = index(Some(&results));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_add_form_fields() {
        let html = add_form();
        for name in [
            "firstName",
            "lastName",
            "identityNum",
            "phone",
            "birthDate",
            "gender",
            "about",
            "motherId",
            "fatherId",
            "photo",
        ] {
            assert!(html.contains(&format!(r#"name="{name}""#)), "missing {name}");
        }
        assert!(html.contains("multipart/form-data"));
    }

    #[test]
    fn test_edit_form_prefilled() {
        let mut p = person(7, "Ayşe", "Yılmaz");
        p.about = "Notes & more".to_string();
        p.photo_path = "uploads/1_a.png".to_string();
        let html = edit_form(&p);

        assert!(html.contains(r#"action="/edit/7""#));
        assert!(html.contains(r#"value="Ayşe""#));
        assert!(html.contains(r#"<option value="K" selected>"#));
        assert!(html.contains("Notes &amp; more"));
        assert!(html.contains(r#"src="/uploads/1_a.png""#));
        assert!(!html.contains("motherId"));
    }
}
