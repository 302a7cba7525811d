use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Media, Reaction, SpanStyle, TextContent, TextSpan};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Empty string when the pattern cannot be rendered.
pub fn format_timestamp(ts: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", ts.format(pattern)).is_err() {
        return String::new();
    }
    out
}

pub fn format_day(day: &NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", day.format(pattern)).is_err() {
        return day.to_string();
    }
    out
}

pub(super) fn render_text(text: &TextContent) -> String {
    match text {
        TextContent::Plain(plain) => format!("<p>{}</p>", escape_html(plain)),
        TextContent::Spans(spans) => {
            let combined: String = spans.iter().map(render_span).collect();
            format!("<p>{}</p>", combined)
        }
    }
}

fn render_span(span: &TextSpan) -> String {
    match span {
        TextSpan::Plain(text) => escape_html(text),
        TextSpan::Styled { style, text } => {
            let text = escape_html(text);
            match style {
                SpanStyle::Bold => format!("<b>{}</b>", text),
                SpanStyle::Italic => format!("<i>{}</i>", text),
                SpanStyle::Strikethrough => format!("<s>{}</s>", text),
                SpanStyle::Link { href } => format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="link">{}</a>"#,
                    escape_html(href),
                    text
                ),
            }
        }
    }
}

pub(super) fn render_media(media: &Media) -> String {
    match media {
        Media::Photo { path } => format!(
            r#"<img src="{}" alt="Photo" loading="lazy" class="media media-photo" />"#,
            escape_html(path)
        ),
        Media::Sticker { path } => format!(
            r#"<img src="{}" alt="Sticker" loading="lazy" class="media media-sticker" />"#,
            escape_html(path)
        ),
        Media::Voice { path } => format!(
            r#"<audio controls src="{}" class="media media-voice"></audio>"#,
            escape_html(path)
        ),
        Media::Video { path } => format!(
            r#"<video controls src="{}" class="media media-video"></video>"#,
            escape_html(path)
        ),
        Media::File { path, file_name } => format!(
            r#"<div class="attachment"><a href="{}" target="_blank" rel="noopener noreferrer" download><span>{}</span></a></div>"#,
            escape_html(path),
            escape_html(file_name.as_deref().unwrap_or(path))
        ),
    }
}

pub(super) fn render_reaction(reaction: &Reaction) -> String {
    format!(
        r#"<span class="reaction-bubble">{} {}</span>"#,
        escape_html(&reaction.emoji),
        reaction.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five() {
        let out = escape_html(r#"<script>&"'"#);
        assert_eq!(out, "&lt;script&gt;&amp;&quot;&#039;");
        for c in ['<', '>', '"', '\''] {
            assert!(!out.contains(c));
        }
    }

    #[test]
    fn spans_keep_order_and_escape() {
        let text = TextContent::Spans(vec![
            TextSpan::Plain("a<".to_string()),
            TextSpan::Styled { style: SpanStyle::Bold, text: "b".to_string() },
            TextSpan::Styled { style: SpanStyle::Strikethrough, text: "c".to_string() },
            TextSpan::Styled {
                style: SpanStyle::Link { href: "https://x.example/?a=1&b=2".to_string() },
                text: "d".to_string(),
            },
        ]);
        let html = render_text(&text);
        assert_eq!(
            html,
            "<p>a&lt;<b>b</b><s>c</s><a href=\"https://x.example/?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"link\">d</a></p>"
        );
    }

    #[test]
    fn file_falls_back_to_path() {
        let html = render_media(&Media::File { path: "files/a b.pdf".to_string(), file_name: None });
        assert!(html.contains("<span>files/a b.pdf</span>"));
        let named = render_media(&Media::File {
            path: "files/x.bin".to_string(),
            file_name: Some("report.pdf".to_string()),
        });
        assert!(named.contains("<span>report.pdf</span>"));
    }

    #[test]
    fn reaction_badge_text() {
        let html = render_reaction(&Reaction { emoji: "👍".to_string(), count: 3 });
        assert!(html.contains("👍 3"));
    }

    #[test]
    fn formats_with_pattern() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("ts");
        assert_eq!(format_timestamp(&ts, "%d.%m.%Y, %H:%M"), "02.01.2024, 03:04");
        assert_eq!(format_day(&ts.date(), "%Y/%m/%d"), "2024/01/02");
    }
}
