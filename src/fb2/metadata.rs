use crate::model::Metadata;

use super::tree::Element;

/// Read book metadata from `description/title-info`.
///
/// Missing fields stay empty; metadata never fails a load.
pub fn parse_metadata(root: &Element) -> Metadata {
    let Some(info) = root
        .child("description")
        .and_then(|description| description.child("title-info"))
    else {
        return Metadata::default();
    };

    Metadata {
        title: info.child("book-title").map(field).unwrap_or_default(),
        authors: info.children_named("author").filter_map(author_name).collect(),
        language: info.child("lang").map(field).unwrap_or_default(),
        genres: info
            .children_named("genre")
            .map(field)
            .filter(|genre| !genre.is_empty())
            .collect(),
    }
}

fn field(element: &Element) -> String {
    element.text().trim().to_string()
}

/// "First Middle Last", or the nickname when no name parts are given.
fn author_name(author: &Element) -> Option<String> {
    let parts: Vec<String> = ["first-name", "middle-name", "last-name"]
        .iter()
        .filter_map(|part| author.child(part).map(field))
        .filter(|part| !part.is_empty())
        .collect();
    if !parts.is_empty() {
        return Some(parts.join(" "));
    }
    author
        .child("nickname")
        .map(field)
        .filter(|nickname| !nickname.is_empty())
}
