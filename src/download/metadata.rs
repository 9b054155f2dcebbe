//! Plain-text talk description written next to the video as `metadata.txt`.

use std::fmt::Write as _;

use crate::schema::TalkRecord;

/// Column at which paragraphs are wrapped.
pub const WRAP_WIDTH: usize = 80;

/// Link labels are padded to the longest label, but never beyond this.
pub const MAX_LINK_LABEL_WIDTH: usize = 37;

const BANNER_RULE: &str = "########################";

/// Renders the metadata text for `talk`.
///
/// Layout: title, subtitle, language, then bannered Abstract and
/// Description sections and, when present, a Links section.
#[must_use]
pub fn render_metadata(talk: &TalkRecord) -> String {
    let mut out = String::new();
    out.push_str(&talk.title);
    out.push('\n');
    out.push_str(&talk.subtitle);
    out.push('\n');
    if let Some(language) = &talk.language {
        let _ = writeln!(out, "Language: {language}");
    }
    out.push('\n');

    push_banner(&mut out, "Abstract");
    out.push_str(&wrap_text(&talk.abstract_text, WRAP_WIDTH));
    out.push_str("\n\n");

    push_banner(&mut out, "Description");
    out.push_str(&wrap_text(&talk.summary, WRAP_WIDTH));
    out.push('\n');

    if !talk.links.is_empty() {
        out.push('\n');
        push_banner(&mut out, "Links");
        let width = talk
            .links
            .iter()
            .map(|link| link.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LINK_LABEL_WIDTH);
        for link in &talk.links {
            let _ = writeln!(out, "  - {:<width$}   {}", link.label, link.url);
        }
    }
    out
}

/// Three-line banner with the title centred in a 24 column box; odd
/// padding puts the extra space on the left.
fn push_banner(out: &mut String, title: &str) {
    let inner = BANNER_RULE.len() - 6;
    let pad = inner.saturating_sub(title.chars().count());
    let left = pad.div_ceil(2);
    let right = pad / 2;
    let _ = writeln!(out, "{BANNER_RULE}");
    let _ = writeln!(out, "#--{}{title}{}--#", " ".repeat(left), " ".repeat(right));
    let _ = writeln!(out, "{BANNER_RULE}");
    out.push('\n');
}

/// Greedy word wrap; each input line is wrapped as its own paragraph.
/// Words longer than `width` are kept whole on their own line.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Link;

    fn talk() -> TalkRecord {
        TalkRecord {
            id: "7550".to_string(),
            title: "Say hi to your new boss".to_string(),
            subtitle: "How algorithms might soon control our lives".to_string(),
            abstract_text: "Short abstract.".to_string(),
            summary: "Long description.".to_string(),
            language: Some("English".to_string()),
            ..TalkRecord::default()
        }
    }

    #[test]
    fn test_render_without_links() {
        let text = render_metadata(&talk());
        let expected = "Say hi to your new boss\n\
How algorithms might soon control our lives\n\
Language: English\n\
\n\
########################\n\
#--     Abstract     --#\n\
########################\n\
\n\
Short abstract.\n\
\n\
########################\n\
#--    Description   --#\n\
########################\n\
\n\
Long description.\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_links_padded() {
        let mut talk = talk();
        talk.links = vec![
            Link {
                label: "Blog".to_string(),
                url: "https://blog.example".to_string(),
            },
            Link {
                label: "Project page".to_string(),
                url: "https://project.example".to_string(),
            },
        ];
        let text = render_metadata(&talk);
        assert!(text.contains("#--       Links      --#"));
        let blog = format!("  - Blog{}   https://blog.example\n", " ".repeat(8));
        assert!(text.contains(&blog), "{text}");
        assert!(text.contains("  - Project page   https://project.example\n"));
    }

    #[test]
    fn test_link_padding_is_capped() {
        let mut talk = talk();
        talk.links = vec![
            Link {
                label: "x".repeat(50),
                url: "https://long.example".to_string(),
            },
            Link {
                label: "short".to_string(),
                url: "https://short.example".to_string(),
            },
        ];
        let text = render_metadata(&talk);
        let padded = format!("  - short{}   https://short.example", " ".repeat(32));
        assert!(text.contains(&padded), "{text}");
    }

    #[test]
    fn test_wrap_text_breaks_at_width() {
        let text = "aaa bbb ccc ddd";
        assert_eq!(wrap_text(text, 7), "aaa bbb\nccc ddd");
        assert_eq!(wrap_text("averyveryverylongword x", 5), "averyveryverylongword\nx");
    }

    #[test]
    fn test_wrap_text_keeps_paragraphs() {
        assert_eq!(wrap_text("one  two\n\nthree", 80), "one two\nthree");
    }

    #[test]
    fn test_wrap_text_no_line_exceeds_width() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        for line in wrap_text(&text, WRAP_WIDTH).lines() {
            assert!(line.chars().count() <= WRAP_WIDTH);
        }
    }
}
