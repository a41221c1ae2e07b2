//! HTML page and README markdown rendering.
//!
//! Output is a pure function of its inputs (no timestamps, no random ids),
//! so regenerating an unchanged manifest yields a byte-identical page.

use crate::config::{ExplorerConfig, NetworkConfig};
use crate::enrich::EnrichedEntry;
use crate::urls::{badge_url, prompt_url};
use std::fmt::Write;

/// Everything needed to render one repository page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    /// Raw manifest URL, linked from the page.
    pub manifest_url: &'a str,
    pub warning: Option<&'a str>,
    pub attribution: Option<&'a str>,
    pub entries: &'a [EnrichedEntry],
}

/// Renders enriched entries into the explorer page.
#[derive(Debug, Clone)]
pub struct Renderer {
    prompt_base_url: String,
    badge_base_url: String,
}

impl Renderer {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            prompt_base_url: config.prompt_base_url.clone(),
            badge_base_url: config.badge_base_url.clone(),
        }
    }

    fn badge(&self, entry: &EnrichedEntry) -> String {
        badge_url(&self.badge_base_url, &entry.slug)
    }

    /// Link used by the README snippet. Entries without a prompt link to
    /// the bare retrieval URL.
    fn readme_link(&self, entry: &EnrichedEntry) -> String {
        prompt_url(
            &self.prompt_base_url,
            &entry.retrieval_url,
            entry.entry.prompt.as_deref(),
        )
    }

    /// Markdown table suitable for pasting into a README.
    pub fn markdown_table(&self, entries: &[EnrichedEntry]) -> String {
        let mut md = String::from("| Summary | Prompt it |\n|---------|-----------|");
        for entry in entries {
            let _ = write!(
                md,
                "\n| {} | [![]({})]({}) |",
                markdown_cell(&entry.entry.summary),
                self.badge(entry),
                self.readme_link(entry)
            );
        }
        md
    }

    /// Full HTML document for a repository.
    pub fn render_page(&self, page: &PageContext<'_>) -> String {
        let title = escape_html(&format!("{}/{}", page.owner, page.repo));
        let count = page.entries.len();
        let mut html = String::with_capacity(16 * 1024);

        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Context Explorer: {title}</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="page-header">
    <h1>Context Explorer: {title}</h1>
    <button class="btn-refresh" onclick="refreshData()">
      <span id="refresh-icon">&#x1F504;</span>
      <span id="refresh-text">Refresh</span>
    </button>
  </div>
"#
        );

        if let Some(warning) = page.warning {
            let _ = writeln!(html, r#"  <div class="warning">{}</div>"#, escape_html(warning));
        }

        let _ = writeln!(
            html,
            r#"  <p>Found {} context{} in this repository (<a href="{}">view raw context.json</a>).</p>"#,
            count,
            if count == 1 { "" } else { "s" },
            escape_html(page.manifest_url)
        );

        if let Some(attribution) = page.attribution {
            let _ = writeln!(
                html,
                r#"  <p class="attribution">{}</p>"#,
                escape_html(attribution)
            );
        }

        self.write_entries_table(&mut html, page.entries);
        self.write_markdown_section(&mut html, page.entries);
        write_context_data(&mut html, page.entries);

        let _ = write!(html, "  <script>{SCRIPT}</script>\n</body>\n</html>\n");
        html
    }

    fn write_entries_table(&self, html: &mut String, entries: &[EnrichedEntry]) {
        html.push_str(
            r#"  <table>
    <thead>
      <tr><th>Slug</th><th>Summary</th><th>Tokens</th><th>Actions</th></tr>
    </thead>
    <tbody>
"#,
        );

        for entry in entries {
            let slug = escape_html(&entry.slug);
            let tokens = entry
                .token_count
                .map(|t| t.to_string())
                .unwrap_or_else(|| "N/A".to_string());

            let _ = write!(
                html,
                r#"      <tr>
        <td><strong>{slug}</strong></td>
        <td class="summary">{summary}</td>
        <td class="tokens">{tokens} <button class="btn btn-copy" data-slug="{slug}" onclick="copyContext(this)">Copy</button></td>
        <td class="actions">"#,
                summary = escape_html(&entry.entry.summary),
            );

            if entry.is_ok() {
                let _ = write!(
                    html,
                    r#"<a href="{}" target="_blank"><img src="{}" alt="open" /></a>"#,
                    escape_html(&entry.retrieval_url),
                    NetworkConfig::OPEN_BADGE_URL
                );
                if let Some(prompt) = &entry.prompt_url {
                    let _ = write!(
                        html,
                        r#"<a href="{}" target="_blank"><img src="{}" alt="prompt" /></a>"#,
                        escape_html(prompt),
                        escape_html(&self.badge(entry))
                    );
                }
            } else {
                let _ = write!(
                    html,
                    "<span class=\"error\">Error: {}</span>",
                    escape_html(entry.error.as_deref().unwrap_or("Failed to load context"))
                );
            }

            html.push_str("</td>\n      </tr>\n");
        }

        html.push_str("    </tbody>\n  </table>\n");
    }

    fn write_markdown_section(&self, html: &mut String, entries: &[EnrichedEntry]) {
        let markdown = self.markdown_table(entries);
        let _ = write!(
            html,
            r#"  <div class="markdown-section">
    <div class="markdown-header">
      <h2>README Markdown Snippet</h2>
      <button class="btn-copy-markdown" onclick="copyMarkdown(this)">Copy Markdown</button>
    </div>
    <div class="split-view">
      <div class="markdown-raw"><pre id="markdown-content">{}</pre></div>
      <div class="markdown-rendered">
        <table>
          <thead><tr><th>Summary</th><th>Prompt it</th></tr></thead>
          <tbody>
"#,
            escape_html(&markdown)
        );

        for entry in entries {
            let _ = writeln!(
                html,
                r#"            <tr><td>{}</td><td><a href="{}" target="_blank"><img src="{}" alt="Prompt it" /></a></td></tr>"#,
                escape_html(&entry.entry.summary),
                escape_html(&self.readme_link(entry)),
                escape_html(&self.badge(entry))
            );
        }

        html.push_str("          </tbody>\n        </table>\n      </div>\n    </div>\n  </div>\n");
    }
}

fn write_context_data(html: &mut String, entries: &[EnrichedEntry]) {
    html.push_str("  <div id=\"contexts-data\" style=\"display:none;\">");
    for entry in entries {
        if let Some(content) = &entry.content {
            let _ = write!(
                html,
                r#"<div data-context="{}">{}</div>"#,
                escape_html(&entry.slug),
                escape_html(content)
            );
        }
    }
    html.push_str("</div>\n");
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep a summary on one table row.
fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; }
    .page-header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 20px; }
    .page-header h1 { margin: 0; }
    .warning { background-color: #fff3cd; color: #856404; padding: 10px; border-radius: 4px; margin-bottom: 20px; }
    .attribution { color: #6a737d; font-size: 0.9em; }
    table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    th, td { padding: 12px 15px; text-align: left; border-bottom: 1px solid #ddd; }
    th { background-color: #f8f9fa; font-weight: 600; }
    .summary { max-width: 300px; }
    .tokens { text-align: right; }
    .actions { display: flex; gap: 8px; }
    .error { color: #b31d28; }
    .btn { padding: 3px 5px; border: none; border-radius: 4px; cursor: pointer; font-size: 9px; }
    .btn-copy { background-color: #e9ecef; color: #495057; }
    .btn-refresh { padding: 8px 16px; background-color: #28a745; color: white; border: none; border-radius: 6px; cursor: pointer; font-size: 14px; }
    .btn-refresh:disabled { background-color: #6c757d; cursor: not-allowed; }
    .markdown-section { margin-top: 30px; }
    .markdown-header { display: flex; align-items: center; gap: 10px; margin-bottom: 15px; }
    .markdown-header h2 { margin: 0; font-size: 1.25rem; }
    .btn-copy-markdown { padding: 6px 12px; background-color: #0969da; color: white; border: none; border-radius: 6px; cursor: pointer; font-size: 12px; }
    .split-view { display: flex; border: 1px solid #d1d9e0; border-radius: 6px; overflow: hidden; min-height: 400px; }
    .markdown-raw { flex: 1; background-color: #f6f8fa; padding: 16px; border-right: 1px solid #d1d9e0; overflow-x: auto; }
    .markdown-raw pre { margin: 0; white-space: pre-wrap; overflow-wrap: break-word; font-family: 'SFMono-Regular', Consolas, 'Liberation Mono', Menlo, monospace; font-size: 12px; }
    .markdown-rendered { flex: 1; padding: 16px; overflow-x: auto; }
    .markdown-rendered table { margin: 0; }
    .markdown-rendered th, .markdown-rendered td { padding: 8px 12px; border: 1px solid #d1d9e0; }
    @keyframes spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }
    @media (max-width: 768px) { .split-view { flex-direction: column; } .markdown-raw { border-right: none; border-bottom: 1px solid #d1d9e0; } }
  "#;

const SCRIPT: &str = r#"
    function flash(button, text) {
      const original = button.textContent;
      button.textContent = text;
      setTimeout(() => { button.textContent = original; }, 2000);
    }

    function copyContext(button) {
      const slug = button.dataset.slug;
      const node = Array.from(document.querySelectorAll('#contexts-data [data-context]'))
        .find((el) => el.dataset.context === slug);
      if (!node) { return; }
      navigator.clipboard.writeText(node.textContent)
        .then(() => flash(button, 'Copied!'))
        .catch((err) => { console.error('Failed to copy text: ', err); alert('Failed to copy context'); });
    }

    function copyMarkdown(button) {
      const node = document.getElementById('markdown-content');
      navigator.clipboard.writeText(node.textContent)
        .then(() => flash(button, 'Copied!'))
        .catch((err) => { console.error('Failed to copy markdown: ', err); alert('Failed to copy markdown'); });
    }

    async function refreshData() {
      const button = document.querySelector('.btn-refresh');
      const icon = document.getElementById('refresh-icon');
      const text = document.getElementById('refresh-text');
      button.disabled = true;
      icon.style.animation = 'spin 1s linear infinite';
      text.textContent = 'Refreshing...';
      try {
        const response = await fetch(window.location.pathname + '?refresh=true');
        if (!response.ok) { throw new Error('Failed to refresh data'); }
        setTimeout(() => window.location.reload(), 500);
      } catch (err) {
        console.error('Refresh failed:', err);
        button.disabled = false;
        icon.style.animation = '';
        text.textContent = 'Refresh';
        alert('Failed to refresh data. Please try again.');
      }
    }
  "#;
