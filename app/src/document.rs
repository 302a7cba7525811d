use export_view_core::render::{escape_html, PageItem, RenderedPage};
use export_view_core::ViewerConfig;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f4f4f5; color: #18181b; }
header { position: sticky; top: 0; display: flex; justify-content: space-between; align-items: center; padding: 0.75rem 1rem; background: #fff; border-bottom: 1px solid #e4e4e7; }
header h1 { margin: 0; font-size: 1.1rem; }
.pager { display: flex; gap: 0.75rem; align-items: center; }
.pager .disabled { color: #a1a1aa; }
main { max-width: 48rem; margin: 0 auto; padding: 1rem; display: flex; flex-direction: column; gap: 0.5rem; }
.date-separator { align-self: center; font-size: 0.8rem; color: #71717a; padding: 0.25rem 0.75rem; }
.msg-self, .msg-other, .msg-service { max-width: 80%; padding: 0.5rem 0.75rem; border-radius: 0.75rem; border: 2px solid transparent; }
.msg-self { align-self: flex-end; background: #dbeafe; }
.msg-other { align-self: flex-start; background: #fff; }
.msg-service { align-self: center; background: transparent; color: #71717a; font-size: 0.85rem; }
.msg-call.call-positive { border-color: #86efac; }
.msg-call.call-negative { border-color: #fca5a5; }
.message-header { display: flex; gap: 0.5rem; font-size: 0.75rem; color: #52525b; }
.message-header .author { font-weight: 600; }
.message-body p { margin: 0.25rem 0; white-space: pre-wrap; }
.media { display: block; margin-top: 0.5rem; max-width: 20rem; border-radius: 0.5rem; }
.message-footer { display: flex; flex-wrap: wrap; gap: 0.25rem; margin-top: 0.25rem; }
.reaction-bubble { font-size: 0.8rem; background: #f4f4f5; border-radius: 999px; padding: 0 0.5rem; }
.reply-btn { font-size: 0.75rem; border: none; background: none; color: #2563eb; cursor: pointer; text-align: left; }
.highlight { border-color: #f59e0b; }
"#;

const SCRIPT: &str = r#"
document.addEventListener('click', function (event) {
  var control = event.target.closest('[data-reply-to]');
  if (!control) return;
  var target = document.getElementById('msg-' + control.getAttribute('data-reply-to'));
  if (!target) return;
  target.scrollIntoView({ behavior: 'smooth', block: 'center' });
  target.classList.add('highlight');
  setTimeout(function () { target.classList.remove('highlight'); }, __HIGHLIGHT_MS__);
});
"#;

pub fn page_file_name(page: usize) -> String {
    format!("page-{:03}.html", page + 1)
}

pub fn render_document(page: &RenderedPage, config: &ViewerConfig) -> String {
    let title = escape_html(&page.chat_name);
    let mut out = String::with_capacity(4096 + page.items.len() * 512);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n", title, STYLE));
    out.push_str(&format!(
        "<header><h1 id=\"chatTitle\">{}</h1>{}</header>\n",
        title,
        render_pager(page)
    ));
    out.push_str("<main id=\"contentArea\">\n");
    for item in &page.items {
        match item {
            PageItem::DaySeparator { label, .. } => {
                out.push_str(&format!(
                    "<div class=\"date-separator\"><span>{}</span></div>\n",
                    escape_html(label)
                ));
            }
            PageItem::Block(block) => {
                out.push_str(&block.html);
                out.push('\n');
            }
        }
    }
    out.push_str("</main>\n");
    out.push_str(&format!(
        "<script>{}</script>\n",
        SCRIPT.replace("__HIGHLIGHT_MS__", &config.highlight_ms.to_string())
    ));
    out.push_str("</body>\n</html>\n");
    out
}

fn render_pager(page: &RenderedPage) -> String {
    let state = page.pagination;
    let prev = if state.has_previous() {
        format!(
            "<a class=\"prev\" href=\"{}\">&larr; Previous</a>",
            page_file_name(state.current_page - 1)
        )
    } else {
        "<span class=\"prev disabled\" aria-disabled=\"true\">&larr; Previous</span>".to_string()
    };
    let next = if state.has_next() {
        format!(
            "<a class=\"next\" href=\"{}\">Next &rarr;</a>",
            page_file_name(state.current_page + 1)
        )
    } else {
        "<span class=\"next disabled\" aria-disabled=\"true\">Next &rarr;</span>".to_string()
    };
    format!(
        "<nav class=\"pager\">{}<span class=\"page-label\">Page {} of {}</span>{}</nav>",
        prev,
        state.current_page + 1,
        state.total_pages,
        next
    )
}
