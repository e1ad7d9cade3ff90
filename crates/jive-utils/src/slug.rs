//! Filesystem-safe slugs for the Store→File default path template
//! `<type>/<id>_<slug(title)>.<ext>` (spec §4.5, §6.2).

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase, ASCII, hyphen-separated slug of `title`. Collapses runs of
/// non-alphanumeric characters to a single `-` and trims leading/trailing
/// hyphens. Empty or fully non-alphanumeric input slugifies to `"untitled"`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_sep = true; // suppress leading hyphen
    for grapheme in title.graphemes(true) {
        let lower = grapheme.to_lowercase();
        let is_alnum = lower.chars().all(|c| c.is_ascii_alphanumeric());
        if is_alnum {
            slug.push_str(&lower);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('-');
            last_was_sep = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "untitled".to_owned()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(
            slugify("E-commerce Platform Modernization"),
            "e-commerce-platform-modernization"
        );
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("foo   bar--baz"), "foo-bar-baz");
    }

    #[test]
    fn empty_title_becomes_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  hello world  "), "hello-world");
    }
}
