use std::sync::LazyLock;

use regex::Regex;

/// Template extension. Only files with it take part in deduplication.
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// Identifier prefix rewritten to its canonical upper case.
const CVE_PREFIX: &str = "CVE-";

static HASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)-[a-f0-9]{32}\.yaml$").expect("invalid regex"));

/// The name a template is grouped under.
///
/// `cve-` in any case becomes `CVE-`, then a trailing `-<32 hex>` content
/// hash before `.yaml` is dropped:
/// `cve-2023-1234-0123456789abcdef0123456789abcdef.yaml` → `CVE-2023-1234.yaml`.
pub fn logical_name(file_name: &str) -> String {
    let normalized = match file_name.get(..CVE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CVE_PREFIX) => {
            format!("{CVE_PREFIX}{}", &file_name[CVE_PREFIX.len()..])
        }
        _ => file_name.to_owned(),
    };

    match HASH_SUFFIX.captures(&normalized) {
        Some(caps) => format!("{}.{TEMPLATE_EXTENSION}", &caps[1]),
        None => normalized,
    }
}

/// Output name for the duplicate at `index` within its group: `<stem>_<index>.yaml`.
pub fn numbered_name(logical: &str, index: usize) -> String {
    let stem = logical.strip_suffix(".yaml").unwrap_or(logical);
    format!("{stem}_{index}.{TEMPLATE_EXTENSION}")
}
