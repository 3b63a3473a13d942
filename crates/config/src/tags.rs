//! File classification tags
//!
//! Hooks filter files by type tags (`types: [python]`, `exclude_types:
//! [binary]`). Tags are derived from the file name (extension or well-known
//! name), the filesystem entry (symlink, executable bit), and content
//! sniffing (text vs binary, shebang interpreter for extensionless
//! executables).

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Tags derived from extensions; every entry implies `text` unless listed
/// in [`BINARY_EXTENSIONS`]
const EXTENSION_TAGS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("c", &["c"]),
    ("cc", &["c++"]),
    ("cfg", &["ini"]),
    ("cjs", &["javascript"]),
    ("cpp", &["c++"]),
    ("css", &["css"]),
    ("cxx", &["c++"]),
    ("go", &["go"]),
    ("h", &["c", "header"]),
    ("hpp", &["c++", "header"]),
    ("html", &["html"]),
    ("ini", &["ini"]),
    ("java", &["java"]),
    ("js", &["javascript"]),
    ("json", &["json"]),
    ("jsx", &["jsx"]),
    ("kt", &["kotlin"]),
    ("lua", &["lua"]),
    ("markdown", &["markdown"]),
    ("md", &["markdown"]),
    ("mjs", &["javascript"]),
    ("php", &["php"]),
    ("pl", &["perl"]),
    ("proto", &["protobuf"]),
    ("py", &["python"]),
    ("pyi", &["python", "pyi"]),
    ("rb", &["ruby"]),
    ("rs", &["rust"]),
    ("scss", &["scss"]),
    ("sh", &["shell", "sh"]),
    ("sql", &["sql"]),
    ("svg", &["svg", "xml"]),
    ("swift", &["swift"]),
    ("tex", &["tex"]),
    ("toml", &["toml"]),
    ("ts", &["ts"]),
    ("tsx", &["tsx"]),
    ("txt", &["plain-text"]),
    ("xml", &["xml"]),
    ("yaml", &["yaml"]),
    ("yml", &["yaml"]),
    ("zsh", &["shell", "zsh"]),
];

/// Extensions that are binary formats; these imply `binary`, not `text`
const BINARY_EXTENSIONS: &[(&str, &[&str])] = &[
    ("gif", &["image"]),
    ("gz", &["archive"]),
    ("jpeg", &["image"]),
    ("jpg", &["image"]),
    ("pdf", &["pdf"]),
    ("png", &["image"]),
    ("tar", &["archive"]),
    ("woff2", &["font"]),
    ("zip", &["archive"]),
];

/// Tags derived from well-known file names
const NAME_TAGS: &[(&str, &[&str])] = &[
    ("BUILD", &["bazel"]),
    ("Dockerfile", &["dockerfile"]),
    ("Gemfile", &["ruby"]),
    ("Makefile", &["makefile"]),
    ("Rakefile", &["ruby"]),
    ("makefile", &["makefile"]),
];

/// Tags derived from shebang interpreters, for extensionless executables
const INTERPRETER_TAGS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("node", &["javascript"]),
    ("perl", &["perl"]),
    ("python", &["python"]),
    ("python3", &["python"]),
    ("ruby", &["ruby"]),
    ("sh", &["shell", "sh"]),
    ("zsh", &["shell", "zsh"]),
];

/// Classify a file, returning its tag set
///
/// `path` is the path used for name-based tags (usually relative to the
/// repository root); `root` is joined in front of it for filesystem access.
/// Classification never fails: a path that cannot be read simply gets no
/// filesystem-derived tags.
#[must_use]
pub fn tags_from_path(root: &Path, path: &Path) -> HashSet<&'static str> {
    let mut tags = HashSet::new();
    let full = root.join(path);

    let metadata = fs::symlink_metadata(&full).ok();
    if let Some(meta) = &metadata {
        if meta.file_type().is_symlink() {
            tags.insert("symlink");
            // A dangling or foreign symlink gets no content tags
            return tags;
        }
        if meta.is_file() {
            tags.insert("file");
            if is_executable(meta) {
                tags.insert("executable");
            } else {
                tags.insert("non-executable");
            }
        } else if meta.is_dir() {
            tags.insert("directory");
            return tags;
        }
    }

    let mut named = false;
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if let Some((_, extra)) = EXTENSION_TAGS.iter().find(|(e, _)| *e == ext) {
            tags.extend(extra.iter().copied());
            tags.insert("text");
            named = true;
        } else if let Some((_, extra)) = BINARY_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            tags.extend(extra.iter().copied());
            tags.insert("binary");
            named = true;
        }
    } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if let Some((_, extra)) = NAME_TAGS.iter().find(|(n, _)| *n == name) {
            tags.extend(extra.iter().copied());
            tags.insert("text");
            named = true;
        } else if tags.contains("executable")
            && let Some(interpreter) = read_shebang_interpreter(&full)
            && let Some((_, extra)) = INTERPRETER_TAGS
                .iter()
                .find(|(i, _)| *i == interpreter || interpreter.starts_with(*i))
        {
            tags.extend(extra.iter().copied());
            tags.insert("text");
            named = true;
        }
    }

    // Fall back to content sniffing when the name told us nothing
    if !named && metadata.as_ref().is_some_and(std::fs::Metadata::is_file) {
        if looks_binary(&full) {
            tags.insert("binary");
        } else {
            tags.insert("text");
        }
    }

    tags
}

/// Whether a tag name is one sekisho can ever assign
#[must_use]
pub fn is_known_tag(tag: &str) -> bool {
    const STRUCTURAL: &[&str] = &[
        "file",
        "directory",
        "symlink",
        "executable",
        "non-executable",
        "text",
        "binary",
    ];

    STRUCTURAL.contains(&tag)
        || EXTENSION_TAGS.iter().any(|(_, tags)| tags.contains(&tag))
        || BINARY_EXTENSIONS.iter().any(|(_, tags)| tags.contains(&tag))
        || NAME_TAGS.iter().any(|(_, tags)| tags.contains(&tag))
        || INTERPRETER_TAGS.iter().any(|(_, tags)| tags.contains(&tag))
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// Read the interpreter name from a shebang line, if any
///
/// `#!/usr/bin/env python3` and `#!/usr/bin/python3` both yield `python3`.
fn read_shebang_interpreter(path: &Path) -> Option<String> {
    use std::io::{BufRead, BufReader};

    let file = fs::File::open(path).ok()?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line).ok()?;

    let shebang = first_line.strip_prefix("#!")?.trim();
    let mut parts = shebang.split_whitespace();
    let program = parts.next()?;

    let program_name = Path::new(program).file_name()?.to_str()?;
    if program_name == "env" {
        parts.next().map(ToString::to_string)
    } else {
        Some(program_name.to_string())
    }
}

/// Sniff the first KiB for NUL bytes, git's own text/binary heuristic
fn looks_binary(path: &Path) -> bool {
    let Ok(mut file) = fs::File::open(path) else {
        return false;
    };
    let mut buf = [0u8; 1024];
    let Ok(n) = file.read(&mut buf) else {
        return false;
    };
    buf[..n].contains(&0)
}
