use std::fmt::Write as _;

use crate::playback::MIN_LAYOUT_WIDTH;

pub const ENTRY_FILE_NAME: &str = "index.htm";
pub const SRC_DIR_NAME: &str = "src";
pub const STYLESHEET_FILE_NAME: &str = "styles.css";
pub const PLAYER_FILE_NAME: &str = "looper.js";
pub const VENDOR_FILE_NAME: &str = "jquery.min.js";

/// One slide reference in document order.
#[derive(Clone, Debug)]
pub struct SlideRef {
    /// `src` attribute value: an artifact-relative filename or a data URI.
    pub src: String,
    pub alt: String,
}

#[derive(Clone, Debug)]
pub struct OverlayRef {
    pub src: String,
}

/// Typed model of the entry document. All untrusted text flows through
/// [`escape_html`] in exactly one place, the render methods below.
#[derive(Clone, Debug)]
pub struct EntryDocument {
    /// Sanitized display title; still escaped at render time.
    pub title: String,
    pub slides: Vec<SlideRef>,
    pub overlay: Option<OverlayRef>,
    /// Serialized `LoopConfig` object literal for the bootstrap call.
    pub config_literal: String,
}

impl EntryDocument {
    /// The artifact entry point: external stylesheet, scripts, and image
    /// files referenced by path, bootstrap invoking the player exactly once.
    pub fn render(&self) -> String {
        let head = format!(
            r#"    <meta charset="UTF-8">
    <title>{title}</title>
    <link rel="stylesheet" href="{src_dir}/{css}">
    <script src="{src_dir}/{vendor}"></script>
    <script src="{src_dir}/{player}"></script>"#,
            title = escape_html(&self.title),
            src_dir = SRC_DIR_NAME,
            css = STYLESHEET_FILE_NAME,
            vendor = VENDOR_FILE_NAME,
            player = PLAYER_FILE_NAME,
        );
        self.render_with_head(&head)
    }

    /// Self-contained variant: the stylesheet and both scripts inlined, for
    /// single-file previews whose slides are data URIs.
    pub fn render_inline(&self, stylesheet: &str, vendor_script: &str, player_script: &str) -> String {
        let head = format!(
            "    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n    <style>\n{stylesheet}\n    </style>\n    <script>\n{vendor_script}\n    </script>\n    <script>\n{player_script}\n    </script>",
            title = escape_html(&self.title),
        );
        self.render_with_head(&head)
    }

    fn render_with_head(&self, head: &str) -> String {
        let mut slide_elements = String::new();
        for slide in &self.slides {
            let _ = writeln!(
                slide_elements,
                r#"                    <img src="{}" alt="{}" class="img-responsive">"#,
                escape_html(&slide.src),
                escape_html(&slide.alt),
            );
        }

        let overlay_element = match &self.overlay {
            Some(overlay) => format!(
                "\n                <img id=\"overlayImage\" src=\"{}\" alt=\"Overlay\" class=\"overlay-image\" style=\"display: none;\">",
                escape_html(&overlay.src),
            ),
            None => String::new(),
        };

        format!(
            r#"<!doctype html>
<html lang="en">
<head>
{head}
    <script>
        $(document).ready(function() {{
            $(".looper").looper({config});
        }});
    </script>
</head>
<body>
    <div class="container-fluid">
        <div class="loop-content">
            <div id="preload-wrapper">
                <div class="looper">
{slides}                </div>{overlay}
            </div>
        </div>
    </div>
</body>
</html>
"#,
            head = head,
            config = self.config_literal,
            slides = slide_elements,
            overlay = overlay_element,
        )
    }
}

/// Display title from a raw folder name: strip characters illegal in the
/// presentation context, collapse whitespace, trim.
pub fn sanitize_title(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Leaf filename from an untrusted source name: same illegal set as titles,
/// whitespace runs become single underscores.
pub fn sanitize_file_name(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Minimal HTML entity escaping, applied to every interpolated value.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Generated stylesheet, parameterized by the probed layout width. The
/// wrapper never renders narrower than [`MIN_LAYOUT_WIDTH`].
pub fn stylesheet(layout_width: u32) -> String {
    let width = layout_width.max(MIN_LAYOUT_WIDTH);
    format!(
        r#"/* Generated loop styles */

body {{
    margin: 0;
    padding: 20px;
    background: #f5f5f5;
    font-family: Arial, sans-serif;
}}

.container-fluid {{
    background: white;
    border-radius: 8px;
    box-shadow: 0 2px 10px rgba(0,0,0,0.1);
    overflow: hidden;
}}

.loop-content {{
    padding: 0;
}}

#preload-wrapper {{
    min-width: {min_width}px;
    max-width: {width}px;
    margin: 0 auto;
}}

.looper-wrap {{
    clear: left;
    display: block;
    margin: 0 auto;
    font-family: Arial, sans-serif;
}}

.looper {{
    position: relative;
}}

.img-responsive {{
    display: block;
    max-width: 100%;
    height: auto;
}}

.overlay-image {{
    position: absolute;
    top: 0;
    left: 0;
    max-width: 100%;
    height: auto;
    z-index: 10;
}}

.navigation {{
    padding: 8px;
    overflow: hidden;
    color: #000;
    background: #f8f9fa;
    border-top: 1px solid #ddd;
}}

.nav_left {{
    float: left;
}}

.nav_right {{
    float: right;
}}

.prev, .next, .reset, .slower, .faster, .pauseplay, .overlay-toggle {{
    float: left;
    display: block;
    width: 32px;
    height: 32px;
    margin: 4px;
    cursor: pointer;
    border: 2px solid #333;
    text-align: center;
    line-height: 28px;
    border-radius: 4px;
    background: #f8f9fa;
    color: #333;
    text-decoration: none;
}}

.prev:hover, .next:hover, .reset:hover, .slower:hover, .faster:hover,
.pauseplay:hover, .overlay-toggle:hover {{
    color: #007bff;
    border-color: #007bff;
    background: #e7f1ff;
}}

.overlay-toggle.active {{
    color: #007bff;
    border-color: #007bff;
}}

.counter {{
    float: left;
    margin-top: 12px;
    margin-right: 8px;
    font-weight: bold;
}}

.speed {{
    float: left;
    border-left: 1px solid #333;
    padding: 0 10px;
    margin-left: 10px;
}}

.slower, .faster {{
    border-radius: 50%;
}}

.invisible {{
    visibility: hidden;
}}
"#,
        min_width = MIN_LAYOUT_WIDTH,
        width = width,
    )
}
