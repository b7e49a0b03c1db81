//! Built-in XSS blocklist.
//!
//! Every entry is a lowercase substring; inputs are lowercased before
//! matching.

/// Marker introducing an embedded base64 HTML document.
pub const DATA_URI_MARKER: &str = "data:text/html;base64,";

/// Curated substrings that indicate XSS intent.
pub const DEFAULT_PATTERNS: &[&str] = &[
    // HTML tags
    "<script", "</script", "<iframe", "</iframe", "<object", "</object",
    "<embed", "</embed", "<applet", "</applet", "<svg", "</svg",
    "<math", "</math", "<link", "<meta", "<style", "</style",
    "<img", "<image", "<video", "<audio", "<body", "</body",
    "<base", "<form", "<isindex", "<marquee", "<textarea",
    "<xmp", "<plaintext", "<noscript", "<title",
    // Event handlers
    "onerror=", "onload=", "onclick=", "onmouseover=", "onfocus=",
    "onblur=", "onresize=", "onunload=", "onbeforeunload=", "onmousemove=",
    "onmouseout=", "onmousedown=", "onmouseup=", "onkeypress=", "onkeydown=",
    "onkeyup=", "oncontextmenu=", "onsubmit=", "onreset=", "onchange=",
    "ondblclick=", "onmouseenter=", "onmouseleave=", "onpaste=", "oncut=",
    "oncopy=", "oninput=", "ontouchstart=", "ontouchmove=", "ontouchend=",
    // Script invocation
    "javascript:", "alert(", "eval(", "settimeout(", "setinterval(",
    "document.write(", "document.body.innerhtml", "window.location",
    "window.open(", "innerhtml=", "outerhtml=", "location.href=",
    "location.replace(", "exec(", "function(", "prompt(", "confirm(",
    // Data URIs
    DATA_URI_MARKER, "data:application/javascript;base64,",
    // CSS
    "style=", "expression(", "url(javascript:", "@import",
    // Encoded variants
    "%3cscript", "%3ciframe", "%3cimg", "&#x3cscript", "&#x3ciframe",
    "&#x3cimg", "\\x3cscript", "\\x3ciframe", "\\x3cimg",
    "\\u003cscript", "\\u003ciframe", "\\u003cimg",
    // URI-carrying attributes
    "srcdoc=", "src=", "href=", "action=", "formaction=",
    "data=", "xmlns=", "xlink:href=", "base64,", "vbs:", "vbscript:",
    "document.cookie", "window.name", "parent.location", "top.location",
    // Markup breakouts
    "<!--", "-->", "<!", "!>", "</", "/>",
    "\">", "'>", "`>", "\"`>",
    "`> alert(", "`> prompt(", "`> confirm(",
    // Comments and CDATA
    "<!--#", "--!>", "<!-->", "--->", "<![cdata[", "]]>",
    "<!--[if", "[if gte", "<!--[endif",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_lowercase() {
        for pattern in DEFAULT_PATTERNS {
            assert_eq!(*pattern, pattern.to_lowercase(), "entry {pattern:?} is not lowercase");
            assert!(!pattern.is_empty());
        }
    }
}
