//! Pure helpers over message and file content.
//!
//! Nothing here renders; the UI uses these to decide *what* to render.

/// Normalise a repository path for transmission (`\` → `/`).
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

// ─── Code blocks ─────────────────────────────────────────────

/// A piece of assistant output: prose or a fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    Code { language: String, code: String },
}

/// Split markdown-ish content into prose and fenced code blocks.
///
/// A fence that is still open at the end (the stream has not delivered the
/// closing fence yet) is treated as code up to the end of the input.
pub fn scan_code_blocks(content: &str) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut code: Option<(String, String)> = None;

    for line in content.split_inclusive('\n') {
        let is_fence = line.trim_start().starts_with("```");
        if is_fence {
            match code.take() {
                Some((language, body)) => segments.push(ContentSegment::Code {
                    language,
                    code: strip_trailing_newline(body),
                }),
                None => {
                    if !text.is_empty() {
                        segments.push(ContentSegment::Text(std::mem::take(&mut text)));
                    }
                    let info = line.trim().trim_start_matches('`');
                    let language = info.split_whitespace().next().unwrap_or("").to_string();
                    code = Some((language, String::new()));
                }
            }
        } else if let Some((_, body)) = code.as_mut() {
            body.push_str(line);
        } else {
            text.push_str(line);
        }
    }

    if let Some((language, body)) = code {
        segments.push(ContentSegment::Code {
            language,
            code: strip_trailing_newline(body),
        });
    }
    if !text.is_empty() {
        segments.push(ContentSegment::Text(text));
    }
    segments
}

fn strip_trailing_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

/// Look for a `// File: path` or `# File: path` header line.
///
/// Returns the path and the code with the header line removed. The header
/// is only stripped when a newline follows it.
pub fn detect_code_filename(code: &str) -> Option<(String, String)> {
    let mut offset = 0;
    for line in code.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let bare = line.trim_end_matches(['\n', '\r']);
        let Some(path) = parse_file_header(bare) else {
            continue;
        };

        let clean = if line.ends_with('\n') {
            format!("{}{}", &code[..start], &code[offset..])
        } else {
            code.to_string()
        };
        return Some((path.to_string(), clean));
    }
    None
}

fn parse_file_header(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("//")
        .or_else(|| line.strip_prefix('#'))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix("File:")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim();
    (!path.is_empty()).then_some(path)
}

// ─── File kinds ──────────────────────────────────────────────

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg",
    "pdf", "eot", "ttf", "woff", "woff2",
    "zip", "tar", "gz", "7z", "rar",
    "exe", "dll", "so", "dylib", "bin",
];

/// How the code viewer should present a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Binary,
    Text { language: &'static str },
}

impl FileKind {
    pub fn detect(path: &str) -> Self {
        let extension = file_extension(path);
        if BINARY_EXTENSIONS.contains(&extension.as_str()) {
            return FileKind::Binary;
        }
        let language = match extension.as_str() {
            "ts" | "tsx" => "typescript",
            "js" | "jsx" => "javascript",
            "py" => "python",
            "css" => "css",
            "html" => "html",
            "json" => "json",
            "sql" => "sql",
            "md" => "markdown",
            "yml" | "yaml" => "yaml",
            _ => "text",
        };
        FileKind::Text { language }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, FileKind::Binary)
    }
}

/// Lower-cased text after the last `.` of the file name.
fn file_extension(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// A file fetched for the code viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub path: String,
    pub content: String,
    pub kind: FileKind,
}

impl FileView {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let kind = FileKind::detect(&path);
        Self {
            path,
            content: content.into(),
            kind,
        }
    }
}
