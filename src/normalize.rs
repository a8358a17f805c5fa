//! Store-path normalization.
//!
//! Store paths embed a 32-character hash that changes between builds of the
//! same package. Erasing it lets two snapshots be compared path-by-path.
use regex::Regex;
use std::sync::OnceLock;

/// Literal that replaces the hash component of a store path.
pub const HASH_TOKEN: &str = "HASH";

/// Store-root spellings recognized inside a path.
pub const STORE_ROOTS: [&str; 3] = ["nix/store/", "nix/.ro-store/", "nix/.rw-store/"];

fn store_hash_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|/)(nix/(?:\.r[wo]-)?store/)(?:[a-z0-9]{32}|HASH)-(.)")
            .expect("valid store regex")
    })
}

fn store_segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|/)(nix/(?:\.r[wo]-)?store/[a-z0-9]{32}-([^/]+))")
            .expect("valid store segment regex")
    })
}

/// Strip leading separators so snapshot keys and link targets line up.
pub fn strip_leading(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Replace the hash of the first store segment with [`HASH_TOKEN`].
///
/// A segment already carrying the token counts as the first one, so later
/// segments stay untouched on repeated calls.
///
/// `nix/store/<hash>-name/bin/x` becomes `nix/store/HASH-name/bin/x`. Paths
/// without a store segment come back unchanged apart from leading `/`.
pub fn normalize_path(path: &str) -> String {
    let path = strip_leading(path);
    store_hash_regex()
        .replacen(path, 1, format!("${{1}}${{2}}{HASH_TOKEN}-${{3}}"))
        .into_owned()
}

/// A `store-root/<hash>-<name>` prefix found inside a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSegment<'a> {
    /// The full segment, e.g. `nix/store/<hash>-pkg-1.0`.
    pub store_path: &'a str,
    /// The package name after the hash, e.g. `pkg-1.0`.
    pub package: &'a str,
}

/// Locate the first store segment in `path`, if any.
pub fn store_segment(path: &str) -> Option<StoreSegment<'_>> {
    let captures = store_segment_regex().captures(path)?;
    Some(StoreSegment {
        store_path: captures.get(1)?.as_str(),
        package: captures.get(2)?.as_str(),
    })
}

/// Return the 32-character hash of the first store segment in `path`.
pub fn store_hash(path: &str) -> Option<&str> {
    let segment = store_segment(path)?;
    let after_root = segment.store_path.split_once("store/")?.1;
    after_root.get(..32)
}

/// Directory portion of a slash-separated path (`""` for a bare name).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join `target` onto `base_dir` and fold `.`/`..` segments lexically.
///
/// No filesystem access happens here. Leading `..` segments that cannot be
/// folded are kept, and an empty result becomes `.`.
pub fn lexical_join(base_dir: &str, target: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let joined = base_dir.split('/').chain(target.split('/'));
    for part in joined {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.join("/")
}
